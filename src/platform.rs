//! Build-target platform codes stored in serialized-file type metadata.
//!
//! The engine writes the platform a file was built for as a `u32`. Codes
//! not listed here are rejected with [`Error::UnsupportedPlatform`] rather
//! than passed through, since later fields of a file built for an unknown
//! target cannot be assumed to follow the layouts this crate decodes.

use std::fmt;

use crate::{Error, Result};

/// Platform a serialized file was built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum TargetPlatform {
    /// No specific target (`-2`).
    NoTarget = -2,
    /// macOS standalone, universal binary.
    StandaloneOsxUniversal = 2,
    /// macOS standalone, PowerPC.
    StandaloneOsxPpc = 3,
    /// macOS standalone, 32-bit Intel.
    StandaloneOsxIntel = 4,
    /// Windows standalone, 32-bit.
    StandaloneWindows = 5,
    /// Browser plugin player.
    WebPlayer = 6,
    /// Browser plugin player, streamed.
    WebPlayerStreamed = 7,
    /// iOS.
    Ios = 9,
    /// PlayStation 3.
    Ps3 = 10,
    /// Xbox 360.
    Xbox360 = 11,
    /// Android.
    Android = 13,
    /// Desktop OpenGL ES emulation.
    StandaloneGlesEmu = 14,
    /// Google Native Client.
    NaCl = 16,
    /// Linux standalone, 32-bit.
    StandaloneLinux = 17,
    /// Adobe Flash.
    FlashPlayer = 18,
    /// Windows standalone, 64-bit.
    StandaloneWindows64 = 19,
    /// WebGL.
    WebGl = 20,
    /// Windows Store apps.
    WsaPlayer = 21,
    /// Linux standalone, 64-bit.
    StandaloneLinux64 = 24,
    /// Linux standalone, 32 and 64-bit.
    StandaloneLinuxUniversal = 25,
    /// Windows Phone 8.
    Wp8Player = 26,
    /// macOS standalone, 64-bit Intel.
    StandaloneOsxIntel64 = 27,
    /// BlackBerry 10.
    BlackBerry = 28,
    /// Tizen.
    Tizen = 29,
    /// PlayStation Vita.
    Psp2 = 30,
    /// PlayStation 4.
    Ps4 = 31,
    /// PlayStation Mobile.
    Psm = 32,
    /// Xbox One.
    XboxOne = 33,
    /// Samsung Smart TV.
    SamsungTv = 34,
    /// Nintendo 3DS.
    N3ds = 35,
    /// Wii U.
    WiiU = 36,
    /// Apple tvOS.
    TvOs = 37,
    /// Nintendo Switch.
    Switch = 38,
}

impl TargetPlatform {
    /// Raw code as written in the file.
    pub fn code(self) -> u32 {
        self as i32 as u32
    }
}

impl TryFrom<u32> for TargetPlatform {
    type Error = Error;
    fn try_from(v: u32) -> Result<Self> {
        use TargetPlatform::*;
        Ok(match v as i32 {
            -2 => NoTarget,
            2 => StandaloneOsxUniversal,
            3 => StandaloneOsxPpc,
            4 => StandaloneOsxIntel,
            5 => StandaloneWindows,
            6 => WebPlayer,
            7 => WebPlayerStreamed,
            9 => Ios,
            10 => Ps3,
            11 => Xbox360,
            13 => Android,
            14 => StandaloneGlesEmu,
            16 => NaCl,
            17 => StandaloneLinux,
            18 => FlashPlayer,
            19 => StandaloneWindows64,
            20 => WebGl,
            21 => WsaPlayer,
            24 => StandaloneLinux64,
            25 => StandaloneLinuxUniversal,
            26 => Wp8Player,
            27 => StandaloneOsxIntel64,
            28 => BlackBerry,
            29 => Tizen,
            30 => Psp2,
            31 => Ps4,
            32 => Psm,
            33 => XboxOne,
            34 => SamsungTv,
            35 => N3ds,
            36 => WiiU,
            37 => TvOs,
            38 => Switch,
            _ => return Err(Error::UnsupportedPlatform(v)),
        })
    }
}

impl fmt::Display for TargetPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?} ({})", *self as i32)
    }
}
