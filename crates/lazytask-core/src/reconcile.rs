use crate::active::ActiveSet;
use crate::snapshot::{Record, Snapshot};
use crate::table::{Cell, CellTone, TableModel};
use tracing::debug;

pub const DEFAULT_INTERVAL_ID_COLUMN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOrder {
    Source,
    Lexicographic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selectable {
    WholeRow,
    Column(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelPolicy {
    pub order: RowOrder,
    pub selectable: Selectable,
    pub track_active: bool,
}

impl PanelPolicy {
    pub fn tasks() -> Self {
        Self {
            order: RowOrder::Lexicographic,
            selectable: Selectable::WholeRow,
            track_active: true,
        }
    }

    pub fn intervals(column: usize) -> Self {
        Self {
            order: RowOrder::Source,
            selectable: Selectable::Column(column),
            track_active: false,
        }
    }

    fn is_selectable(&self, column: usize, text: &str) -> bool {
        match self.selectable {
            Selectable::WholeRow => true,
            Selectable::Column(target) => column == target && !text.is_empty(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reconciliation {
    pub reset: bool,
    pub rows: usize,
}

pub fn needs_reset(
    model: &TableModel,
    snapshot: &Snapshot,
    policy: &PanelPolicy,
    active: &ActiveSet,
) -> bool {
    if snapshot.column_count() != model.column_count() {
        return true;
    }
    // row_count includes the header row
    policy.track_active && active.len() != model.row_count() + 1
}

/// Overwrites every cell of `model` from `snapshot`, clearing it first when the
/// shape changed.
pub fn reconcile(
    model: &mut TableModel,
    snapshot: &Snapshot,
    policy: &PanelPolicy,
    active: &ActiveSet,
) -> Reconciliation {
    let reset = needs_reset(model, snapshot, policy, active);
    if reset {
        model.clear();
    }

    let columns = snapshot.column_count();
    for (column, text) in snapshot.header.iter().enumerate().take(columns) {
        model.set_cell(0, column, Cell::header(text.as_str()));
    }

    let sorted;
    let records: &[Record] = match policy.order {
        RowOrder::Source => &snapshot.records,
        RowOrder::Lexicographic => {
            let mut copy = snapshot.clone();
            copy.sort_by_line();
            sorted = copy;
            &sorted.records
        }
    };

    for (idx, record) in records.iter().enumerate() {
        let row = idx + 1;
        let tone = if policy.track_active && active.contains(row as u32) {
            CellTone::Active
        } else {
            CellTone::Normal
        };
        for column in 0..columns {
            let text = record.fields.get(column).map(String::as_str).unwrap_or("");
            let selectable = policy.is_selectable(column, text);
            model.set_cell(row, column, Cell::new(text, tone, selectable));
        }
    }

    let rows = if columns == 0 { 0 } else { records.len() + 1 };
    model.truncate_rows(rows);

    debug!(reset, rows, columns, "reconciled table");
    Reconciliation { reset, rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::ColumnLayout;
    use proptest::prelude::*;

    fn snapshot(ruler: &str, header: &str, lines: &[&str]) -> Snapshot {
        let layout = ColumnLayout::from_ruler(ruler);
        Snapshot {
            header: layout.decode(header),
            records: lines
                .iter()
                .map(|line| Record {
                    line: (*line).to_string(),
                    fields: layout.decode(line),
                })
                .collect(),
            layout,
        }
    }

    fn tasks_snapshot() -> Snapshot {
        snapshot(
            "-- -----------",
            "ID Description",
            &[" 3 Bake cake", " 1 Buy milk", " 2 Buy eggs"],
        )
    }

    #[test]
    fn tasks_are_sorted_and_active_ordinal_highlighted() {
        let mut model = TableModel::new();
        let active: ActiveSet = [2].into_iter().collect();
        let result = reconcile(&mut model, &tasks_snapshot(), &PanelPolicy::tasks(), &active);

        assert_eq!(result.rows, 4);
        assert_eq!(model.text(0, 1), Some("Description"));
        assert_eq!(model.cell(0, 0).map(|c| c.tone), Some(CellTone::Header));
        assert!(!model.is_row_selectable(0));

        let ids: Vec<_> = (1..4).map(|row| model.text(row, 0).unwrap_or("")).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);

        let tones: Vec<_> = (1..4)
            .map(|row| model.cell(row, 1).map(|c| c.tone))
            .collect();
        assert_eq!(
            tones,
            vec![
                Some(CellTone::Normal),
                Some(CellTone::Active),
                Some(CellTone::Normal)
            ]
        );
        assert!(model.cell(1, 1).is_some_and(|c| c.selectable));
    }

    #[test]
    fn intervals_keep_source_order_and_select_id_column_only() {
        let snap = snapshot(
            "--- -- ----------",
            "Day ID Tags",
            &["Thu @2 review", "    @1 coding", "          "],
        );
        let mut model = TableModel::new();
        reconcile(
            &mut model,
            &snap,
            &PanelPolicy::intervals(1),
            &ActiveSet::default(),
        );

        assert_eq!(model.text(1, 1), Some("@2"));
        assert_eq!(model.text(2, 1), Some("@1"));
        assert!(model.cell(1, 1).is_some_and(|c| c.selectable));
        assert!(model.cell(1, 0).is_some_and(|c| !c.selectable));
        assert!(model.cell(1, 2).is_some_and(|c| !c.selectable));
        assert!(!model.is_row_selectable(3));
        assert_eq!(model.selectable_column(2), Some(1));
    }

    #[test]
    fn column_change_resets_to_exact_shape() {
        let mut model = TableModel::new();
        let wide = snapshot("- - - -", "a b c d", &["1 2 3 4", "5 6 7 8"]);
        reconcile(&mut model, &wide, &PanelPolicy::intervals(0), &ActiveSet::default());
        assert_eq!(model.column_count(), 4);

        let narrow = snapshot("- -", "a b", &["1 2", "3 4"]);
        let result = reconcile(&mut model, &narrow, &PanelPolicy::intervals(0), &ActiveSet::default());

        assert!(result.reset);
        assert_eq!(model.row_count(), 3);
        assert_eq!(model.cell_count(), 3 * 2);
        assert!(model.rows().iter().all(|cells| cells.len() == 2));
    }

    fn grid(columns: usize, rows: usize) -> Snapshot {
        let ruler = vec!["-"; columns].join(" ");
        let line = vec!["x"; columns].join(" ");
        let lines = vec![line.as_str(); rows];
        snapshot(&ruler, &ruler.replace('-', "h"), &lines)
    }

    proptest! {
        #[test]
        fn column_change_keeps_exactly_the_new_shape(
            before in 1usize..8,
            after in 1usize..8,
            rows_before in 0usize..6,
            rows_after in 0usize..6,
        ) {
            prop_assume!(before != after);
            let policy = PanelPolicy::intervals(0);
            let mut model = TableModel::new();
            reconcile(&mut model, &grid(before, rows_before), &policy, &ActiveSet::default());

            let result = reconcile(&mut model, &grid(after, rows_after), &policy, &ActiveSet::default());

            prop_assert!(result.reset);
            prop_assert_eq!(model.row_count(), rows_after + 1);
            prop_assert_eq!(model.cell_count(), (rows_after + 1) * after);
            prop_assert!(model.rows().iter().all(|cells| cells.len() == after));
            prop_assert_eq!(model.cell(0, after), None);
        }
    }

    #[test]
    fn same_shape_overwrites_in_place() {
        let mut model = TableModel::new();
        let policy = PanelPolicy::intervals(0);
        let first = snapshot("-- --", "ab cd", &["1  2", "3  4"]);
        reconcile(&mut model, &first, &policy, &ActiveSet::default());

        let second = snapshot("-- --", "ab cd", &["5  6", "7  8"]);
        let result = reconcile(&mut model, &second, &policy, &ActiveSet::default());

        assert!(!result.reset);
        assert_eq!(model.text(1, 0), Some("5"));
        assert_eq!(model.text(2, 1), Some("8"));
    }

    #[test]
    fn shrinking_body_leaves_no_stale_rows() {
        let mut model = TableModel::new();
        let policy = PanelPolicy::intervals(0);
        let first = snapshot("-- --", "ab cd", &["1  2", "3  4", "5  6"]);
        reconcile(&mut model, &first, &policy, &ActiveSet::default());

        let second = snapshot("-- --", "ab cd", &["1  2"]);
        let result = reconcile(&mut model, &second, &policy, &ActiveSet::default());

        assert!(!result.reset);
        assert_eq!(model.row_count(), 2);
    }

    #[test]
    fn active_count_mismatch_resets_tasks_panel() {
        let mut model = TableModel::new();
        let policy = PanelPolicy::tasks();
        reconcile(&mut model, &tasks_snapshot(), &policy, &ActiveSet::default());
        assert_eq!(model.row_count(), 4);

        let five: ActiveSet = (1..=5).collect();
        assert!(!needs_reset(&model, &tasks_snapshot(), &policy, &five));
        assert!(needs_reset(&model, &tasks_snapshot(), &policy, &ActiveSet::default()));
        assert!(!needs_reset(
            &model,
            &tasks_snapshot(),
            &PanelPolicy::intervals(0),
            &ActiveSet::default()
        ));
    }

    #[test]
    fn empty_report_empties_the_model() {
        let mut model = TableModel::new();
        reconcile(&mut model, &tasks_snapshot(), &PanelPolicy::tasks(), &ActiveSet::default());

        let result = reconcile(
            &mut model,
            &Snapshot::empty(),
            &PanelPolicy::tasks(),
            &ActiveSet::default(),
        );
        assert!(result.reset);
        assert!(model.is_empty());
    }
}
