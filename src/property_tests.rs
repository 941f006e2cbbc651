//! Property-based tests for matrix algebra and the correlation pipeline

#[cfg(test)]
mod tests {
    use crate::mapreduce::plan::tests::plan;
    use crate::mapreduce::{accumulate, PairAggregator};
    use crate::matrix::{ContingencyMatrix, CramerIndex};
    use proptest::prelude::*;
    use std::sync::Arc;

    fn matrix_with_shape(rows: usize, cols: usize) -> impl Strategy<Value = ContingencyMatrix> {
        prop::collection::vec(0u64..1000, rows * cols).prop_map(move |counts| {
            let grid: Vec<Vec<u64>> = counts.chunks(cols).map(|c| c.to_vec()).collect();
            ContingencyMatrix::from_rows(&grid).expect("generated grid is rectangular")
        })
    }

    fn matrix() -> impl Strategy<Value = ContingencyMatrix> {
        (1usize..6, 1usize..6).prop_flat_map(|(rows, cols)| matrix_with_shape(rows, cols))
    }

    fn same_shape_triple() -> impl Strategy<Value = (ContingencyMatrix, ContingencyMatrix, ContingencyMatrix)> {
        (1usize..6, 1usize..6).prop_flat_map(|(rows, cols)| {
            (
                matrix_with_shape(rows, cols),
                matrix_with_shape(rows, cols),
                matrix_with_shape(rows, cols),
            )
        })
    }

    // Records over the shared test schema: size (S/M) and shape (round/square)
    fn record() -> impl Strategy<Value = String> {
        (
            prop::sample::select(vec!["S", "M", "XL"]),
            prop::sample::select(vec!["round", "square"]),
        )
            .prop_map(|(size, shape)| format!("id,red,{},{}", size, shape))
    }

    proptest! {
        #[test]
        fn test_wire_format_round_trips(m in matrix()) {
            let decoded = ContingencyMatrix::deserialize(&m.serialize()).expect("decode failed");
            prop_assert_eq!(decoded, m);
        }

        #[test]
        fn test_merge_commutes_and_associates((a, b, c) in same_shape_triple()) {
            let ab = a.clone().merged(&b).unwrap();
            let ba = b.clone().merged(&a).unwrap();
            prop_assert_eq!(&ab, &ba);

            let ab_c = ab.merged(&c).unwrap();
            let a_bc = a.merged(&b.merged(&c).unwrap()).unwrap();
            prop_assert_eq!(ab_c, a_bc);
        }

        #[test]
        fn test_cramer_index_bounded(m in matrix()) {
            match m.cramer_index() {
                CramerIndex::Defined { value } => {
                    prop_assert!((0.0..=1.0).contains(&value));
                }
                CramerIndex::Undefined { .. } => {
                    let observed_rows = m.row_totals().iter().filter(|&&t| t > 0).count();
                    let observed_cols = m.col_totals().iter().filter(|&&t| t > 0).count();
                    prop_assert!(m.total() == 0 || observed_rows < 2 || observed_cols < 2);
                }
            }
        }

        #[test]
        fn test_partitioned_accumulation_matches_single_pass(
            records in prop::collection::vec(record(), 0..200),
            cut in 0usize..200,
        ) {
            let plan = Arc::new(plan(&[2], &[3]));
            let cut = cut.min(records.len());
            let (left, right) = records.split_at(cut);

            let (whole, _) = accumulate(plan.clone(), records.iter().map(String::as_str)).unwrap();
            let (first, _) = accumulate(plan.clone(), left.iter().map(String::as_str)).unwrap();
            let (second, _) = accumulate(plan.clone(), right.iter().map(String::as_str)).unwrap();

            let aggregator = PairAggregator::new(plan);
            let key = whole[0].key;
            let single = aggregator.aggregate(key, &[whole[0].value.clone()]).unwrap();
            let merged = aggregator
                .aggregate(key, &[first[0].value.clone(), second[0].value.clone()])
                .unwrap();
            prop_assert_eq!(single, merged);
        }
    }
}
