#[macro_use]
extern crate clap;
#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

extern crate eeprom_shift_programmer;
use eeprom_shift_programmer::*;

use std::path::Path;
use std::process::exit;
use std::time::Duration;

use eeprom_shift_programmer::chip::Chip;
use eeprom_shift_programmer::gpio::{
	PinMap,
	SYSFS_GPIO_ROOT,
	SysfsGpio,
};
use eeprom_shift_programmer::payload::{
	DEFAULT_PAYLOAD,
	Payload,
	parse_address,
};
use eeprom_shift_programmer::programmer::Timing;
use eeprom_shift_programmer::sim::SimulatedBoard;

fn get_param<T>(matches: &clap::ArgMatches, name: &str) -> AResult<Option<T>>
where
	T: std::str::FromStr,
	failure::Error: From<<T as std::str::FromStr>::Err>,
{
	let param = match matches.value_of(name) {
		Some(p) => p,
		None => return Ok(None),
	};
	param.parse::<T>().map(Some).map_err(|e| {
		let e = failure::Error::from(e);
		let msg = format!("invalid parameter {}: {}", name, e);
		e.context(msg).into()
	})
}

fn get_micros(matches: &clap::ArgMatches, name: &str, default: Duration) -> AResult<Duration> {
	Ok(get_param::<u64>(matches, name)?.map(Duration::from_micros).unwrap_or(default))
}

fn get_chip(matches: &clap::ArgMatches) -> AResult<Chip> {
	Ok(get_param::<Chip>(matches, "chip")?.unwrap_or_default())
}

fn get_timing(matches: &clap::ArgMatches) -> AResult<Timing> {
	let reference = Timing::REFERENCE;
	Ok(Timing {
		clock_hold: get_micros(matches, "clock_hold", reference.clock_hold)?,
		latch_hold: get_micros(matches, "latch_hold", reference.latch_hold)?,
		address_settle: get_micros(matches, "settle", reference.address_settle)?,
		write_enable_hold: get_micros(matches, "we_hold", reference.write_enable_hold)?,
	})
}

fn get_payload(matches: &clap::ArgMatches) -> AResult<Payload> {
	let start = match matches.value_of("start") {
		Some(s) => Some(parse_address(s)?),
		None => None,
	};
	match matches.value_of("IMAGE") {
		Some(image) => {
			Payload::from_file(Path::new(image), start.unwrap_or(0))
		},
		None => {
			let mut payload = Payload::default();
			if let Some(start) = start {
				payload.start = start;
			}
			info!("no image given, using built-in pattern {:02x?}", DEFAULT_PAYLOAD);
			Ok(payload)
		},
	}
}

fn write(sub_m: &clap::ArgMatches) -> AResult<()> {
	let chip = get_chip(sub_m)?;
	let timing = get_timing(sub_m)?;
	let payload = get_payload(sub_m)?;
	let pins: PinMap = get_param(sub_m, "pins")?.unwrap_or_default();
	let root = Path::new(sub_m.value_of("gpio_root").unwrap_or(SYSFS_GPIO_ROOT));

	// reject before touching any line
	timing.check(chip)?;
	chip.check_range(payload.start as u32, payload.bytes.len())?;

	if sub_m.is_present("realtime") {
		realtime::enter_realtime()?;
	}

	debug!("pin map: {}", pins);
	let gpio = SysfsGpio::open(root, &pins)?;
	program(gpio, chip, timing, &payload, true)?;

	match payload.end() {
		Some(end) => info!("wrote 0x{:04x}..=0x{:04x}; lines parked, safe to power down the EEPROM", payload.start, end),
		None => info!("nothing to write; lines parked"),
	}
	Ok(())
}

fn simulate(sub_m: &clap::ArgMatches) -> AResult<()> {
	let chip = get_chip(sub_m)?;
	let timing = get_timing(sub_m)?;
	let payload = get_payload(sub_m)?;

	let board = program(SimulatedBoard::new(chip), chip, timing, &payload, false)?;

	for (address, data) in board.commits() {
		println!("@{:04x}: {:02x}", address, data);
	}
	info!("{} bytes committed in {:?} (simulated)", board.commits().len(), board.now());

	if !board.violations().is_empty() {
		for v in board.violations() {
			error!("{}", v);
		}
		exit(1);
	}
	Ok(())
}

fn show_duration(d: Option<Duration>) -> String {
	match d {
		Some(d) => format!("{:?}", d),
		None => "(too long)".to_string(),
	}
}

fn timing(sub_m: &clap::ArgMatches) -> AResult<()> {
	let chip = get_chip(sub_m)?;
	let timing = get_timing(sub_m)?;

	println!("chip:              {} ({} bytes, {} address bits)", chip, chip.size(), chip.address_width());
	println!("clock hold:        {:?}", timing.clock_hold);
	println!("latch hold:        {:?}", timing.latch_hold);
	println!("address settle:    {:?}", timing.address_settle);
	println!("write enable hold: {:?} (chip needs {:?})", timing.write_enable_hold, chip.write_pulse_min());
	println!("write cycle gap:   {} (chip needs {:?})", show_duration(timing.write_cycle_gap()), chip.write_cycle_max());
	println!("per byte:          {}", show_duration(timing.byte_duration()));

	if let Err(e) = timing.check(chip) {
		eprintln!("Timing not usable for {}: {}", chip, e);
		exit(1);
	}
	Ok(())
}

fn main_app() -> AResult<()> {
	let matches = clap_app!(@app (app_from_crate!())
		(@setting SubcommandRequiredElseHelp)
		(global_setting: clap::AppSettings::VersionlessSubcommands)
		(@subcommand write =>
			(about: "write image to the EEPROM through sysfs GPIO lines")
			(@arg chip: -c --chip +takes_value "target chip (AT28C16, AT28C64B, AT28C256; default AT28C64B)")
			(@arg start: -s --start +takes_value "start address (decimal or 0x-hex; default 0, 32 for the built-in pattern)")
			(@arg clock_hold: --("clock-hold") +takes_value "shift clock hold in µs (default 500)")
			(@arg latch_hold: --("latch-hold") +takes_value "latch hold in µs (default 500)")
			(@arg settle: --settle +takes_value "address settle delay in µs (default 500)")
			(@arg we_hold: --("we-hold") +takes_value "write enable setup/hold in µs (default 800)")
			(@arg pins: -p --pins +takes_value "GPIO assignments, e.g. \"we=4,ser=17,srclk=27,rclk=22,io0=5\"")
			(@arg gpio_root: --("gpio-root") +takes_value "sysfs GPIO directory (default /sys/class/gpio)")
			(@arg realtime: -r --realtime "lock memory and use real-time scheduling")
			(@arg IMAGE: "binary image (default: built-in test pattern)")
		)
		(@subcommand simulate =>
			(about: "run the write sequence against a simulated board and print committed bytes")
			(@arg chip: -c --chip +takes_value "target chip (AT28C16, AT28C64B, AT28C256; default AT28C64B)")
			(@arg start: -s --start +takes_value "start address (decimal or 0x-hex; default 0, 32 for the built-in pattern)")
			(@arg clock_hold: --("clock-hold") +takes_value "shift clock hold in µs (default 500)")
			(@arg latch_hold: --("latch-hold") +takes_value "latch hold in µs (default 500)")
			(@arg settle: --settle +takes_value "address settle delay in µs (default 500)")
			(@arg we_hold: --("we-hold") +takes_value "write enable setup/hold in µs (default 800)")
			(@arg IMAGE: "binary image (default: built-in test pattern)")
		)
		(@subcommand timing =>
			(about: "show and check effective timing for a chip")
			(@arg chip: -c --chip +takes_value "target chip (AT28C16, AT28C64B, AT28C256; default AT28C64B)")
			(@arg clock_hold: --("clock-hold") +takes_value "shift clock hold in µs (default 500)")
			(@arg latch_hold: --("latch-hold") +takes_value "latch hold in µs (default 500)")
			(@arg settle: --settle +takes_value "address settle delay in µs (default 500)")
			(@arg we_hold: --("we-hold") +takes_value "write enable setup/hold in µs (default 800)")
		)
	).get_matches();

	match matches.subcommand() {
		("write", Some(sub_m)) => {
			write(sub_m)
		},
		("simulate", Some(sub_m)) => {
			simulate(sub_m)
		},
		("timing", Some(sub_m)) => {
			timing(sub_m)
		},
		("", _) => bail!("no subcommand"),
		(cmd, _) => bail!("not implemented subcommand {:?}", cmd),
	}
}

fn main() {
	env_logger::from_env(env_logger::Env::default().default_filter_or("info")).init();

	if let Err(e) = main_app() {
		error!("Error: {}", e);
		exit(1);
	}
}
