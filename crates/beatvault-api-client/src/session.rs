//! Client-held upload session for one in-progress product submission.
//!
//! The session is owned by a single client context and mutated through `&mut self`, so
//! every edit applies whole before the next one starts. Edits never fail; only
//! submission (see [`crate::submit`]) has externally observable failures.

use crate::staged::StagedFile;
use crate::submit::SlotTransfer;
use beatvault_core::constants::MAX_TAGS;
use beatvault_core::models::MetadataField;
use beatvault_core::{ProductMetadata, Slot, WizardStep};
use std::collections::BTreeMap;
use uuid::Uuid;

static NOT_ATTEMPTED: SlotTransfer = SlotTransfer::NotAttempted;

#[derive(Debug, Clone)]
pub struct UploadSession {
    id: Uuid,
    owner_id: String,
    step: WizardStep,
    slots: BTreeMap<Slot, StagedFile>,
    metadata: ProductMetadata,
    tag_input: String,
    transfers: BTreeMap<Slot, SlotTransfer>,
}

impl UploadSession {
    /// A fresh session on the first step with every slot empty.
    pub fn new(owner_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id: owner_id.into(),
            step: WizardStep::FIRST,
            slots: BTreeMap::new(),
            metadata: ProductMetadata::default(),
            tag_input: String::new(),
            transfers: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn slot(&self, slot: Slot) -> Option<&StagedFile> {
        self.slots.get(&slot)
    }

    /// Occupied slots in wizard order.
    pub fn slots(&self) -> impl Iterator<Item = (Slot, &StagedFile)> {
        self.slots.iter().map(|(slot, file)| (*slot, file))
    }

    pub fn metadata(&self) -> &ProductMetadata {
        &self.metadata
    }

    pub fn tags(&self) -> &[String] {
        &self.metadata.tags
    }

    pub fn tag_input(&self) -> &str {
        &self.tag_input
    }

    /// Transfer state of `slot` from the most recent submission attempt.
    pub fn transfer(&self, slot: Slot) -> &SlotTransfer {
        self.transfers.get(&slot).unwrap_or(&NOT_ATTEMPTED)
    }

    /// Stage `file` in `slot`, replacing whatever was there.
    ///
    /// The slot's accept hint is not enforced. A replaced file must be uploaded again, so
    /// the slot's transfer state is reset.
    pub fn assign_slot(&mut self, slot: Slot, file: StagedFile) {
        if let Some(previous) = self.slots.insert(slot, file) {
            tracing::debug!(slot = %slot, replaced = %previous.name, "Slot reassigned");
        }
        self.transfers.remove(&slot);
    }

    pub fn update_metadata_field(&mut self, field: MetadataField) {
        self.metadata.apply(field);
    }

    /// Replace the transient tag input buffer.
    pub fn set_tag_input(&mut self, value: impl Into<String>) {
        self.tag_input = value.into();
    }

    /// Commit the tag input buffer as a tag.
    pub fn confirm_tag(&mut self) -> bool {
        let raw = std::mem::take(&mut self.tag_input);
        let added = self.add_tag(&raw);
        if !added {
            self.tag_input = raw;
        }
        added
    }

    /// Append the trimmed tag and clear the input buffer.
    ///
    /// Blank input and input beyond `MAX_TAGS` are ignored, not errors. Returns whether
    /// the tag was added.
    pub fn add_tag(&mut self, raw: &str) -> bool {
        let tag = raw.trim();
        if tag.is_empty() || self.metadata.tags.len() >= MAX_TAGS {
            return false;
        }
        self.metadata.tags.push(tag.to_string());
        self.tag_input.clear();
        true
    }

    /// Remove the tag at `index`; out-of-range indexes are ignored.
    pub fn remove_tag(&mut self, index: usize) {
        if index < self.metadata.tags.len() {
            self.metadata.tags.remove(index);
        }
    }

    /// Move to the next wizard step. Not gated on the current step's content; stays put
    /// on the last step.
    pub fn advance_step(&mut self) {
        if let Some(next) = self.step.next() {
            self.step = next;
        }
    }

    /// Drop everything staged and start over with a new session id for the same owner.
    pub fn discard(&mut self) {
        *self = Self::new(std::mem::take(&mut self.owner_id));
    }

    pub(crate) fn record_transfer(&mut self, slot: Slot, transfer: SlotTransfer) {
        self.transfers.insert(slot, transfer);
    }

    /// Object keys of every slot whose latest transfer succeeded.
    pub fn uploaded_keys(&self) -> BTreeMap<Slot, String> {
        self.transfers
            .iter()
            .filter_map(|(slot, transfer)| match transfer {
                SlotTransfer::Succeeded { key } => Some((*slot, key.clone())),
                _ => None,
            })
            .collect()
    }
}
