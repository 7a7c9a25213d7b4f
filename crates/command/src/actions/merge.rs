use tabula_engine::Sheet;

use super::{check_range, SheetMutation};
use crate::action_data::{ActionPayload, AddMerges, RemoveMerges};
use crate::error::ValidationError;

impl SheetMutation for AddMerges {
    fn validate(&self, sheet: &Sheet) -> Result<(), ValidationError> {
        for (i, range) in self.ranges.iter().enumerate() {
            check_range(sheet, range)?;
            if range.is_single() {
                return Err(ValidationError::SingleCellMerge(*range));
            }
            if let Some(existing) = sheet.merge_overlapping(range) {
                return Err(ValidationError::OverlappingMerge(*range, existing));
            }
            if let Some(other) = self.ranges[..i].iter().find(|m| m.overlaps(range)) {
                return Err(ValidationError::OverlappingMerge(*range, *other));
            }
        }
        Ok(())
    }

    fn apply(&self, sheet: &mut Sheet) -> ActionPayload {
        for range in &self.ranges {
            sheet.add_merge(*range);
        }
        // Added merges are disjoint from everything else, so removing by
        // overlap removes exactly these.
        RemoveMerges { ranges: self.ranges.clone() }.into()
    }
}

impl SheetMutation for RemoveMerges {
    fn validate(&self, sheet: &Sheet) -> Result<(), ValidationError> {
        self.ranges.iter().try_for_each(|range| check_range(sheet, range))
    }

    fn apply(&self, sheet: &mut Sheet) -> ActionPayload {
        let mut removed: Vec<_> = self
            .ranges
            .iter()
            .flat_map(|range| sheet.remove_merges_overlapping(range))
            .collect();
        removed.sort();
        AddMerges { ranges: removed }.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabula_core::CellRange;
    use tabula_engine::SheetId;

    fn sheet() -> Sheet {
        Sheet::new(SheetId(1), 20, 20)
    }

    #[test]
    fn test_add_rejects_single_cell_and_overlap() {
        let mut s = sheet();
        s.add_merge(CellRange::new(0, 0, 1, 1));

        let single = AddMerges { ranges: vec![CellRange::single(5, 5)] };
        assert_eq!(single.validate(&s), Err(ValidationError::SingleCellMerge(CellRange::single(5, 5))));

        let overlapping = AddMerges { ranges: vec![CellRange::new(1, 1, 2, 2)] };
        assert!(matches!(overlapping.validate(&s), Err(ValidationError::OverlappingMerge(..))));

        let self_overlap = AddMerges { ranges: vec![CellRange::new(3, 3, 4, 4), CellRange::new(4, 4, 5, 5)] };
        assert!(matches!(self_overlap.validate(&s), Err(ValidationError::OverlappingMerge(..))));
    }

    #[test]
    fn test_remove_then_inverse_restores_merges() {
        let mut s = sheet();
        s.add_merge(CellRange::new(0, 0, 1, 1));
        s.add_merge(CellRange::new(0, 3, 0, 5));
        s.add_merge(CellRange::new(10, 0, 11, 0));
        let before = s.clone();

        let inverse = RemoveMerges { ranges: vec![CellRange::new(0, 0, 0, 9)] }.apply(&mut s);
        assert_eq!(s.merges(), &[CellRange::new(10, 0, 11, 0)]);
        assert_eq!(
            inverse,
            ActionPayload::from(AddMerges { ranges: vec![CellRange::new(0, 0, 1, 1), CellRange::new(0, 3, 0, 5)] })
        );

        inverse.mutation().apply(&mut s);
        assert_eq!(s, before);
    }
}
