use strum::Display;
use strum::EnumString;

/// Receiver zone a command applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Zone {
    Main,
    Zone2,
    Zone3,
    Zone4,
}

/// Input rename: `IRN<id>` queries the custom name of one input.
pub const IRN: &str = "IRN";
pub const IRN_NAME: &str = "input-selector-rename-input-function-rename";

/// Commands a receiver is likely to send while we are talking to it.
///
/// Anything else is passed through under its three-letter code.
const COMMANDS: &[(&str, Zone, &str)] = &[
    ("PWR", Zone::Main, "system-power"),
    ("AMT", Zone::Main, "audio-muting"),
    ("MVL", Zone::Main, "master-volume"),
    ("SLI", Zone::Main, "input-selector"),
    (IRN, Zone::Main, IRN_NAME),
    ("LMD", Zone::Main, "listening-mode"),
    ("NRI", Zone::Main, "receiver-information"),
    ("NJA", Zone::Main, "jacket-art"),
    ("ZPW", Zone::Zone2, "power"),
    ("ZMT", Zone::Zone2, "muting"),
    ("ZVL", Zone::Zone2, "volume"),
    ("SLZ", Zone::Zone2, "selector"),
    ("PW3", Zone::Zone3, "power"),
    ("MT3", Zone::Zone3, "muting"),
    ("VL3", Zone::Zone3, "volume"),
    ("SL3", Zone::Zone3, "selector"),
    ("PW4", Zone::Zone4, "power"),
    ("MT4", Zone::Zone4, "muting"),
    ("VL4", Zone::Zone4, "volume"),
    ("SL4", Zone::Zone4, "selector"),
];

/// Zone and long command name for a three-letter command code.
pub fn lookup(code: &str) -> Option<(Zone, &'static str)> {
    COMMANDS
        .iter()
        .find(|(c, _, _)| *c == code)
        .map(|(_, zone, name)| (*zone, *name))
}
