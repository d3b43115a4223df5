// OS-specific. for now linux sysfs only.

mod pins;
mod sysfs;

pub use self::pins::PinMap;

pub use self::sysfs::{
	SYSFS_GPIO_ROOT,
	SysfsGpio,
};
