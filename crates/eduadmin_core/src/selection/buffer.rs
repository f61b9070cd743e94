use crate::models::Record;

/// Toggle buffer owned by a modal selector while it is open.
///
/// Unlike [`super::MultiSelect`] it keeps full records, because the modal
/// commits records (not ids) to its parent.
#[derive(Debug, Clone, Default)]
pub struct SelectionBuffer {
    records: Vec<Record>,
    max: Option<usize>,
}

impl SelectionBuffer {
    pub fn new(preselected: Vec<Record>, max: Option<usize>) -> Self {
        let mut buffer = Self {
            records: Vec::new(),
            max,
        };
        for record in preselected {
            if !buffer.contains(&record) && !buffer.is_full() {
                buffer.records.push(record);
            }
        }
        buffer
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn is_full(&self) -> bool {
        self.max.is_some_and(|max| self.records.len() >= max)
    }

    pub fn contains(&self, record: &Record) -> bool {
        self.records
            .iter()
            .any(|existing| existing.shares_identity(record))
    }

    /// # Returns
    /// `false` when an add was refused at the cap.
    pub fn toggle(&mut self, record: &Record) -> bool {
        if self.contains(record) {
            self.records
                .retain(|existing| !existing.shares_identity(record));
            return true;
        }
        if self.is_full() {
            return false;
        }
        self.records.push(record.clone());
        true
    }

    /// Hand the selected records to the parent, emptying the buffer.
    pub fn commit(&mut self) -> Vec<Record> {
        std::mem::take(&mut self.records)
    }

    /// Discard the buffer without emitting anything.
    pub fn cancel(&mut self) {
        self.records.clear();
    }
}

/// Append committed records the parent does not already hold.
///
/// # Returns
/// How many records were added.
pub fn merge_committed(existing: &mut Vec<Record>, committed: Vec<Record>) -> usize {
    let mut added = 0;
    for record in committed {
        if !existing.iter().any(|held| held.shares_identity(&record)) {
            existing.push(record);
            added += 1;
        }
    }
    added
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: u64) -> Record {
        Record::new(id).with_field("text", format!("Question {id}"))
    }

    #[test]
    fn commit_emits_full_records_and_empties_buffer() {
        let mut buffer = SelectionBuffer::new(vec![question(1)], None);
        buffer.toggle(&question(2));
        let committed = buffer.commit();

        assert_eq!(committed, vec![question(1), question(2)]);
        assert!(buffer.is_empty());
    }

    #[test]
    fn toggle_respects_cap_and_removes_regardless() {
        let mut buffer = SelectionBuffer::new(vec![question(1), question(2)], Some(2));
        assert!(!buffer.toggle(&question(3)));
        assert!(buffer.toggle(&question(1)));
        assert!(buffer.toggle(&question(3)));
        assert_eq!(buffer.records(), &[question(2), question(3)]);
    }

    #[test]
    fn cancel_discards_pending_toggles() {
        let mut buffer = SelectionBuffer::new(Vec::new(), None);
        buffer.toggle(&question(4));
        buffer.cancel();
        assert!(buffer.commit().is_empty());
    }

    #[test]
    fn merge_committed_skips_records_already_held() {
        let mut quiz_questions = vec![question(1)];
        let added = merge_committed(&mut quiz_questions, vec![question(1), question(5)]);
        assert_eq!(added, 1);
        assert_eq!(quiz_questions, vec![question(1), question(5)]);
    }
}
