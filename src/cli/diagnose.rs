use std::{error::Error, path::Path};

use tabled::settings::{Panel, Style};
use tabled::{Table, Tabled};
use tokio::task::JoinSet;

use crate::{
    config::RelayConfig,
    drivers::device_file::DeviceFile,
    host::{self, HostSupport},
    input::{converter::DeviceKind, event::InputEvent},
    procfs::device::{Device, DeviceLocator},
};

const CHECK_MARK: &str = "\u{2713}";
const CROSS_MARK: &str = "\u{2717}";

#[derive(Tabled)]
struct CheckRow {
    check: String,
    status: String,
}

#[derive(Tabled)]
struct InputDeviceRow {
    path: String,
    name: String,
    #[tabled(rename = "used as")]
    used_as: String,
}

fn mark(ok: bool) -> &'static str {
    if ok {
        CHECK_MARK
    } else {
        CROSS_MARK
    }
}

pub async fn handle_diagnose(config: &RelayConfig, echo: bool) -> Result<(), Box<dyn Error>> {
    let support = host::probe("/");
    print_host_support(&support);
    print_gadget_devices(config);

    let locator = DeviceLocator::new(&config.devices_path);
    let devices = locator.get_all().map_err(|e| {
        format!(
            "Unable to read input devices from {}: {e}",
            locator.path().display()
        )
    })?;
    let inputs = resolve_inputs(config, &locator);
    print_input_devices(&devices, &inputs);

    if echo {
        echo_inputs(inputs).await;
    }

    Ok(())
}

fn print_host_support(support: &HostSupport) {
    let rows = vec![
        CheckRow {
            check: "USB host mode supported".to_string(),
            status: mark(support.has_capability).to_string(),
        },
        CheckRow {
            check: "USB host mode enabled".to_string(),
            status: mark(support.is_enabled).to_string(),
        },
    ];
    let mut table = Table::new(rows);
    table
        .with(Style::modern_rounded())
        .with(Panel::header("Host Support"));
    println!("{table}");
}

fn print_gadget_devices(config: &RelayConfig) {
    let rows: Vec<CheckRow> = [DeviceKind::Mouse, DeviceKind::Keyboard]
        .into_iter()
        .map(|kind| {
            let output = &config.channel(kind).output;
            let present = Path::new(output).exists();
            let state = if present { "present" } else { "not found" };
            CheckRow {
                check: format!("{kind} HID gadget ({output})"),
                status: format!("{} {state}", mark(present)),
            }
        })
        .collect();
    let mut table = Table::new(rows);
    table
        .with(Style::modern_rounded())
        .with(Panel::header("HID Gadget Devices"));
    println!("{table}");
}

/// Returns the input device the relay would use for each kind of device
fn resolve_inputs(config: &RelayConfig, locator: &DeviceLocator) -> Vec<(DeviceKind, String)> {
    let mut inputs = Vec::new();
    for kind in [DeviceKind::Mouse, DeviceKind::Keyboard] {
        match config.channel(kind).resolve_input(locator) {
            Ok(path) => {
                println!("{CHECK_MARK} {kind} input device: {path}");
                inputs.push((kind, path));
            }
            Err(e) => println!("{CROSS_MARK} {kind} input device: {e}"),
        }
    }
    inputs
}

fn print_input_devices(devices: &[Device], inputs: &[(DeviceKind, String)]) {
    let rows: Vec<InputDeviceRow> = devices
        .iter()
        .filter_map(|device| {
            let path = device.devnode()?;
            let used_as = inputs
                .iter()
                .filter(|(_, input)| *input == path)
                .map(|(kind, _)| kind.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            Some(InputDeviceRow {
                path,
                name: device.name.clone(),
                used_as,
            })
        })
        .collect();
    let count = rows.len();

    let mut table = Table::new(rows);
    table
        .with(Style::modern_rounded())
        .with(Panel::header("Input Devices"));
    println!("{table}");
    println!("Found {count} input device(s)");
}

/// Print events from the given input devices until Ctrl+C is pressed
async fn echo_inputs(inputs: Vec<(DeviceKind, String)>) {
    if inputs.is_empty() {
        println!("No input devices found, skipping input reading...");
        return;
    }

    println!("Listening for device inputs (press Ctrl+C to exit):");
    let mut tasks = JoinSet::new();
    for (kind, path) in inputs {
        tasks.spawn(echo_input(kind, path));
    }

    tokio::select! {
        _ = tokio::signal::ctrl_c() => (),
        _ = async { while tasks.join_next().await.is_some() {} } => (),
    }
}

async fn echo_input(kind: DeviceKind, path: String) {
    let mut device = match DeviceFile::open_read(&path) {
        Ok(device) => device,
        Err(e) => {
            println!("{CROSS_MARK} Unable to open {kind} device {path}: {e}");
            return;
        }
    };

    loop {
        match InputEvent::read_from(&mut device).await {
            Ok(event) => println!("{kind}: {event}"),
            Err(e) => {
                println!("{CROSS_MARK} Stopped reading {kind} device {path}: {e}");
                return;
            }
        }
    }
}
