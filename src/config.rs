use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(version, about = "Space Invaders arcade cabinet emulator", long_about = None)]
pub struct Settings {
    /// Directory holding invaders.h/g/f/e and the sound effect WAVs
    #[arg(value_name = "DATA_DIR")]
    pub data_dir: PathBuf,

    /// Window scale factor
    #[arg(short, long, value_enum, default_value_t = WindowScale::X2)]
    pub scale: WindowScale,

    /// Start with the colour overlay instead of plain white
    #[arg(long)]
    pub color: bool,

    /// Start in cocktail (upside down) mode
    #[arg(long)]
    pub cocktail: bool,

    /// Don't open an audio device
    #[arg(long)]
    pub mute: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowScale {
    #[value(name = "1")]
    X1,
    #[value(name = "2")]
    X2,
    #[value(name = "4")]
    X4,
    #[value(name = "8")]
    X8,
}

impl From<WindowScale> for minifb::Scale {
    fn from(scale: WindowScale) -> Self {
        match scale {
            WindowScale::X1 => minifb::Scale::X1,
            WindowScale::X2 => minifb::Scale::X2,
            WindowScale::X4 => minifb::Scale::X4,
            WindowScale::X8 => minifb::Scale::X8,
        }
    }
}
