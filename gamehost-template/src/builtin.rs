//! Templates embedded in the binary.

/// An embedded template and its TOML source.
#[derive(Debug, Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    pub summary: &'static str,
    pub source: &'static str,
}

pub const BUILTINS: &[Builtin] = &[
    Builtin {
        name: "pixelmon",
        summary: "Pixelmon server with its world on an Azure Files share",
        source: include_str!("../templates/pixelmon.toml"),
    },
    Builtin {
        name: "pixelmon-logging",
        summary: "pixelmon plus optional Log Analytics diagnostics",
        source: include_str!("../templates/pixelmon-logging.toml"),
    },
    Builtin {
        name: "pixelmon-spot",
        summary: "pixelmon-logging on spot capacity",
        source: include_str!("../templates/pixelmon-spot.toml"),
    },
    Builtin {
        name: "pixelmon-whitelist",
        summary: "pixelmon-spot with whitelist, operators and extra mods",
        source: include_str!("../templates/pixelmon-whitelist.toml"),
    },
    Builtin {
        name: "multi-game",
        summary: "Pixelmon and Terraria in one container group",
        source: include_str!("../templates/multi-game.toml"),
    },
];

pub fn find(name: &str) -> Option<&'static Builtin> {
    BUILTINS.iter().find(|b| b.name == name)
}

pub fn names() -> Vec<&'static str> {
    BUILTINS.iter().map(|b| b.name).collect()
}
