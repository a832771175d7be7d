//! Upload slots and wizard steps.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// One of the fixed upload destinations within a single product submission.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum Slot {
    Cover,
    Mp3Tagged,
    WavUntagged,
    Stems,
}

impl Slot {
    /// Every slot, in wizard display order.
    pub const ALL: [Slot; 4] = [Slot::Cover, Slot::Mp3Tagged, Slot::WavUntagged, Slot::Stems];

    pub fn as_str(&self) -> &'static str {
        match self {
            Slot::Cover => "cover",
            Slot::Mp3Tagged => "mp3Tagged",
            Slot::WavUntagged => "wavUntagged",
            Slot::Stems => "stems",
        }
    }

    /// File extensions a picker should offer for this slot.
    ///
    /// Advisory only: nothing rejects a staged file whose extension is not listed.
    pub fn accept_hint(&self) -> &'static [&'static str] {
        match self {
            Slot::Cover => &["jpg", "jpeg", "png", "webp"],
            Slot::Mp3Tagged => &["mp3"],
            Slot::WavUntagged => &["wav"],
            Slot::Stems => &["zip", "rar"],
        }
    }
}

impl FromStr for Slot {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Slot::ALL
            .into_iter()
            .find(|slot| slot.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| anyhow::anyhow!("Invalid slot: {}", s))
    }
}

impl Display for Slot {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Ordered stages of the upload wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WizardStep {
    /// Stage files into slots.
    Files,
    /// Title, bpm, description, tags.
    Details,
    /// Visibility and final review before submission.
    Publish,
}

impl WizardStep {
    pub const FIRST: WizardStep = WizardStep::Files;
    pub const LAST: WizardStep = WizardStep::Publish;

    /// 1-based position in the wizard.
    pub fn ordinal(&self) -> u8 {
        match self {
            WizardStep::Files => 1,
            WizardStep::Details => 2,
            WizardStep::Publish => 3,
        }
    }

    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        match ordinal {
            1 => Some(WizardStep::Files),
            2 => Some(WizardStep::Details),
            3 => Some(WizardStep::Publish),
            _ => None,
        }
    }

    /// The following step, or `None` on the last one.
    pub fn next(&self) -> Option<Self> {
        Self::from_ordinal(self.ordinal() + 1)
    }
}

impl Default for WizardStep {
    fn default() -> Self {
        WizardStep::FIRST
    }
}
