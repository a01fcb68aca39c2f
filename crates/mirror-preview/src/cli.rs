use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use filter_host::DEFAULT_LOCALE;
use renderer::{GpuMemoryMode, GpuPowerPreference};

#[derive(Parser, Debug)]
#[command(
    name = "mirror-preview",
    author,
    version,
    about = "Preview the mirror filter on still images"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the filter over an image and write the result.
    Render(RenderArgs),
    /// Print the filter's default settings as JSON.
    Defaults,
    /// Print the filter's property schema as JSON.
    Properties(ModuleArgs),
}

#[derive(Args, Debug)]
pub struct ModuleArgs {
    /// Directory holding the effect and `locale/` files (defaults to the bundled data).
    #[arg(long, env = "MIRROR_FILTER_DATA_DIR", value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Locale used for display text.
    #[arg(long, value_name = "LANG", default_value = DEFAULT_LOCALE)]
    pub locale: String,
}

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Input image.
    #[arg(long, value_name = "PATH")]
    pub input: PathBuf,

    /// Output PNG path.
    #[arg(long, value_name = "PATH")]
    pub output: PathBuf,

    /// Settings file (`.toml` or JSON) with user values.
    #[arg(long, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Override the `SwitchLeftToRight` setting.
    #[arg(long, value_name = "BOOL")]
    pub switch_left_to_right: Option<bool>,

    #[command(flatten)]
    pub module: ModuleArgs,

    /// Adapter power preference.
    #[arg(long, value_enum, default_value_t = GpuPower::Low)]
    pub gpu_power: GpuPower,

    /// Device memory hint: `balanced` favours smaller allocations.
    #[arg(long, value_enum, default_value_t = GpuMemory::Balanced)]
    pub gpu_memory: GpuMemory,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpuPower {
    Low,
    High,
}

impl From<GpuPower> for GpuPowerPreference {
    fn from(value: GpuPower) -> Self {
        match value {
            GpuPower::Low => GpuPowerPreference::Low,
            GpuPower::High => GpuPowerPreference::High,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpuMemory {
    Balanced,
    Performance,
}

impl From<GpuMemory> for GpuMemoryMode {
    fn from(value: GpuMemory) -> Self {
        match value {
            GpuMemory::Balanced => GpuMemoryMode::Balanced,
            GpuMemory::Performance => GpuMemoryMode::Performance,
        }
    }
}

pub fn parse() -> Cli {
    Cli::parse()
}
