/*
 * Field and temperature demo session
 *
 * Reproduces a minimal experiment script: start the attoDRY server, connect
 * over the configured COM port, wait for the device to initialise, read the
 * magnetic field and sample temperature, write new set points, and toggle
 * field and full temperature control before shutting down.
 *
 * Set points only take effect once the corresponding control is toggled on,
 * so running this against hardware changes nothing until the final toggles.
 * Pass --simulate to run against the in-memory simulator instead of the
 * vendor DLL.
 */

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;

use attodry::{Cryostat, Settings, MESSAGE_LEN};

#[derive(Parser)]
#[command(about = "attoDRY field and temperature demo session")]
struct Args {
    /// Configuration file (defaults to attodry.toml in the working dir)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the configured COM port
    #[arg(long)]
    port: Option<String>,

    /// Run against the in-memory simulator instead of the vendor DLL
    #[arg(long)]
    simulate: bool,

    /// Magnetic field set point in Tesla
    #[arg(long, default_value_t = 0.01)]
    field: f32,

    /// Sample temperature set point in Kelvin
    #[arg(long, default_value_t = 1.9)]
    temperature: f32,

    /// Seconds to wait for device initialisation
    #[arg(long, default_value_t = 30)]
    init_timeout: u64,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut settings = match &args.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };
    if let Some(port) = args.port {
        settings.com_port = port;
    }
    settings.validate().map_err(anyhow::Error::msg)?;

    let cryostat = if args.simulate {
        Cryostat::simulated()
    } else {
        unsafe { Cryostat::open(&settings.library) }
            .with_context(|| format!("loading {}", settings.library.display()))?
    };

    cryostat.begin(settings.setup)?;
    cryostat.connect(&settings.com_port)?;
    cryostat
        .wait_until_initialised(Duration::from_secs(args.init_timeout))
        .context("device did not come up; is the COM port right?")?;

    println!(
        "attoDRY initialised: connected={} initialised={}",
        cryostat.is_device_connected()?,
        cryostat.is_device_initialised()?,
    );
    println!("action: {}", cryostat.action_message(MESSAGE_LEN)?);

    let field = cryostat.magnetic_field()?;
    let temperature = cryostat.sample_temperature()?;
    println!("current magnetic field: {field} T");
    println!("current sample temperature: {temperature} K");

    cryostat.set_user_magnetic_field(args.field)?;
    cryostat.set_user_temperature(args.temperature)?;
    println!(
        "set points written: B = {} T, T = {} K (inactive until control is toggled)",
        args.field, args.temperature
    );

    cryostat.toggle_magnetic_field_control()?;
    cryostat.toggle_full_temperature_control()?;
    println!(
        "field control: {}, temperature control: {}",
        cryostat.is_controlling_field()?,
        cryostat.is_controlling_temperature()?,
    );

    cryostat.shutdown()?;
    println!("session closed");
    Ok(())
}
