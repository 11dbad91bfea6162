//! Asset classification from filenames.
//!
//! Each axis is an ordered rule table. The first rule with any keyword
//! occurring in the lower-cased filename wins, so more specific keywords must
//! come before the ones they contain (`arm64` before `arm`, `win64` is checked
//! with the x64 rules before `win32`/`x86` ever get a look in).

use crate::models::{Arch, Graphics, Platform, Sounds};

type Rules<T> = &'static [(&'static [&'static str], T)];

// `.zip` and `.tar.gz` are published for every platform, so they carry no
// platform signal.
const PLATFORM_RULES: Rules<Platform> = &[
    (&["android", ".apk", ".aab"], Platform::Android),
    (&["osx", "macos", "mac", "darwin", ".dmg"], Platform::MacOs),
    (&["windows", "win", ".exe", ".msi"], Platform::Windows),
    (&["linux", ".appimage", ".deb", ".rpm"], Platform::Linux),
];

const ARCH_RULES: Rules<Arch> = &[
    (&["arm64", "aarch64", "android-x64"], Arch::Arm64),
    (&["arm32", "aarch32", "armv7", "armeabi", "android-x32"], Arch::Arm32),
    (&["universal", "bundle"], Arch::Universal),
    (&["x86_64", "x86-64", "amd64", "x64", "win64"], Arch::X64),
    (&["x32", "x86", "i386", "i686", "win32"], Arch::X32),
    // Bare "arm" builds are 64-bit.
    (&["arm"], Arch::Arm64),
];

const GRAPHICS_RULES: Rules<Graphics> = &[
    (&["tiles", "graphical", "graphics", "android"], Graphics::Tiles),
    (&["ascii", "curses", "console", "terminal"], Graphics::Ascii),
];

const SOUNDS_RULES: Rules<Sounds> = &[(&["sound"], Sounds::Sounds)];

/// The four classification axes of an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Classification {
    pub platform: Platform,
    pub arch: Arch,
    pub graphics: Graphics,
    pub sounds: Sounds,
}

fn first_match<T: Copy + Default>(haystack: &str, rules: Rules<T>) -> T {
    rules
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|keyword| haystack.contains(keyword)))
        .map(|(_, label)| *label)
        .unwrap_or_default()
}

/// Classify an asset by its filename. Pure and case-insensitive.
///
/// ```
/// use reldb_release::{Arch, Graphics, Platform, Sounds, classify};
///
/// let classified = classify("cataclysmdda-0.F-x64-tiles-sounds.zip");
/// assert_eq!(classified.platform, Platform::Unknown);
/// assert_eq!(classified.arch, Arch::X64);
/// assert_eq!(classified.graphics, Graphics::Tiles);
/// assert_eq!(classified.sounds, Sounds::Sounds);
/// ```
pub fn classify(filename: &str) -> Classification {
    let lowered = filename.to_lowercase();
    Classification {
        platform: first_match(&lowered, PLATFORM_RULES),
        arch: first_match(&lowered, ARCH_RULES),
        graphics: first_match(&lowered, GRAPHICS_RULES),
        sounds: first_match(&lowered, SOUNDS_RULES),
    }
}
