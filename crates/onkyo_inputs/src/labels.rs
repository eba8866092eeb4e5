//! Merging receiver custom names with the default input labels.
//!
//! A settings form shows each input as `"<custom> (<default>)"` when the
//! receiver reports a custom name, and as the bare default label otherwise.
//! The form hands back whatever string the user picked, so [`LabelTable::parse`]
//! has to undo [`LabelTable::format`] exactly.

use std::collections::BTreeMap;
use std::fmt::Write;

use serde::Serialize;

use crate::inputs::CustomNames;
use crate::inputs::InputId;
use crate::inputs::ONKYO_INPUTS;

/// Default label for every input the receiver can select.
///
/// Built once and passed to whatever needs to render or parse labels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelTable {
    labels: BTreeMap<InputId, String>,
}

/// One row of the input list a settings form renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayOption {
    pub id: InputId,
    pub label: String,
    pub custom_name: Option<String>,
    pub default_label: String,
}

impl LabelTable {
    pub fn new(labels: BTreeMap<InputId, String>) -> Self {
        Self { labels }
    }

    /// The stock Onkyo input selector table.
    pub fn onkyo() -> Self {
        let labels = ONKYO_INPUTS
            .iter()
            .filter_map(|(code, label)| {
                InputId::new(code)
                    .ok()
                    .map(|id| (id, (*label).to_string()))
            })
            .collect();
        Self { labels }
    }

    /// Replace or add default labels, e.g. from the `[labels]` config section.
    pub fn with_overrides(mut self, overrides: &BTreeMap<InputId, String>) -> Self {
        for (id, label) in overrides {
            self.labels.insert(*id, label.clone());
        }
        self
    }

    /// All known inputs, in code order.
    pub fn ids(&self) -> Vec<InputId> {
        self.labels.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn default_label(&self, id: InputId) -> Option<&str> {
        self.labels.get(&id).map(String::as_str)
    }

    /// Display label for `id`, or `None` if the input is not in the table.
    pub fn format(&self, id: InputId, names: &CustomNames) -> Option<String> {
        let default = self.default_label(id)?;
        Some(merge_label(names.get(&id).map(String::as_str), default))
    }

    /// Split a display label back into its custom name and default label.
    ///
    /// A string that is itself one of the default labels is never split, so
    /// a default such as `"HDMI (Rear)"` survives even though it looks merged.
    /// Otherwise the longest known default found as a `" (<default>)"` suffix
    /// wins, which keeps custom names like `"TV (Den)"` whole.
    pub fn parse<'a>(&self, display: &'a str) -> (Option<&'a str>, &'a str) {
        if self.labels.values().any(|label| label == display) {
            return (None, display);
        }

        let known = self
            .labels
            .values()
            .filter_map(|label| {
                let custom = display
                    .strip_suffix(')')?
                    .strip_suffix(label.as_str())?
                    .strip_suffix(" (")?;
                (!custom.trim().is_empty()).then_some(custom)
            })
            .min_by_key(|custom| custom.len());
        if let Some(custom) = known {
            return (Some(custom), &display[custom.len() + 2..display.len() - 1]);
        }

        split_label(display)
    }

    /// Find the input a display label was rendered for.
    pub fn resolve(&self, display: &str) -> Option<InputId> {
        let (_, default) = self.parse(display);
        self.labels
            .iter()
            .find(|(_, label)| label.as_str() == default)
            .map(|(id, _)| *id)
    }

    /// Rows for every input in the table.
    pub fn display_options(&self, names: &CustomNames) -> Vec<DisplayOption> {
        self.labels
            .iter()
            .map(|(id, default)| {
                let custom_name = names
                    .get(id)
                    .map(|name| name.trim())
                    .filter(|name| !name.is_empty())
                    .map(str::to_string);
                DisplayOption {
                    id: *id,
                    label: merge_label(custom_name.as_deref(), default),
                    custom_name,
                    default_label: default.clone(),
                }
            })
            .collect()
    }

    /// Plain names per input: the custom name where there is one, otherwise
    /// the default label.
    pub fn display_names(&self, names: &CustomNames) -> BTreeMap<InputId, String> {
        self.labels
            .iter()
            .map(|(id, default)| {
                let name = match names.get(id).map(|n| n.trim()) {
                    Some(custom) if !custom.is_empty() => custom.to_string(),
                    _ => default.clone(),
                };
                (*id, name)
            })
            .collect()
    }
}

/// `"{custom} ({default})"`, or just `default` when there is no usable custom name.
pub fn merge_label(custom: Option<&str>, default: &str) -> String {
    match custom.map(str::trim) {
        Some(custom) if !custom.is_empty() => format!("{} ({})", custom, default),
        _ => default.to_string(),
    }
}

/// Inverse of [`merge_label`].
///
/// Only the outermost trailing `" (...)"` group is treated as the wrapper: the
/// `(` that pairs with the final `)`. Defaults with their own parentheses
/// (`"VIDEO4 ··· AUX1(AUX)"`) and custom names such as `"TV (Den)"` come back
/// intact.
pub fn split_label(display: &str) -> (Option<&str>, &str) {
    let Some(inner) = display.strip_suffix(')') else {
        return (None, display);
    };

    let mut depth = 0usize;
    for (i, c) in inner.char_indices().rev() {
        match c {
            ')' => depth += 1,
            '(' if depth > 0 => depth -= 1,
            '(' => {
                let default = &inner[i + 1..];
                match inner[..i].strip_suffix(' ') {
                    Some(custom) if !custom.trim().is_empty() && !default.is_empty() => {
                        return (Some(custom), default);
                    }
                    _ => break,
                }
            }
            _ => {}
        }
    }
    (None, display)
}

/// Render rows as an aligned text listing, one input per line.
pub fn render_options(options: &[DisplayOption]) -> String {
    let mut out = String::new();
    for option in options {
        let _ = writeln!(out, "{}  {}", option.id, option.label);
    }
    out
}
