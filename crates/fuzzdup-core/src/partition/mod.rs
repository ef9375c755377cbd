//! Static, order-preserving split of a work list across workers.

use tracing::trace;

use crate::error::CoreError;

/// Split `items` into exactly `nchunks` lists by round-robin striding.
///
/// The item at index `i` lands in list `i % nchunks`; each list keeps the input
/// order. Lists beyond the item count come back empty. The result depends only on
/// the input, so re-running a stage reproduces the same assignment.
///
/// Fails with [`CoreError::InvalidChunkCount`] for `nchunks == 0` before
/// consuming anything.
pub fn split_round_robin<I>(items: I, nchunks: usize) -> Result<Vec<Vec<I::Item>>, CoreError>
where
    I: IntoIterator,
{
    if nchunks == 0 {
        return Err(CoreError::InvalidChunkCount(nchunks));
    }

    let iter = items.into_iter();
    let per_chunk = iter.size_hint().0.div_ceil(nchunks);
    let mut chunks: Vec<Vec<I::Item>> = (0..nchunks)
        .map(|_| Vec::with_capacity(per_chunk))
        .collect();

    let mut total = 0usize;
    for (i, item) in iter.enumerate() {
        chunks[i % nchunks].push(item);
        total += 1;
    }

    trace!(items = total, nchunks, "split work list round-robin");
    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("f{i}")).collect()
    }

    /// Interleave the chunks back by `i % n`.
    fn reassemble(chunks: &[Vec<String>]) -> Vec<String> {
        let n = chunks.len();
        let len: usize = chunks.iter().map(Vec::len).sum();
        (0..len).map(|i| chunks[i % n][i / n].clone()).collect()
    }

    #[test]
    fn five_into_two() {
        let chunks = split_round_robin(files(5), 2).unwrap();
        assert_eq!(chunks, vec![vec!["f1", "f3", "f5"], vec!["f2", "f4"]]);
    }

    #[test]
    fn more_chunks_than_items() {
        let chunks = split_round_robin(files(3), 5).unwrap();
        assert_eq!(
            chunks,
            vec![
                vec!["f1".to_string()],
                vec!["f2".to_string()],
                vec!["f3".to_string()],
                vec![],
                vec![],
            ]
        );
    }

    #[test]
    fn single_chunk_is_the_whole_list() {
        let input = files(7);
        let chunks = split_round_robin(input.clone(), 1).unwrap();
        assert_eq!(chunks, vec![input]);
    }

    #[test]
    fn zero_chunks_is_rejected() {
        assert_eq!(
            split_round_robin(files(3), 0),
            Err(CoreError::InvalidChunkCount(0))
        );
    }

    #[test]
    fn empty_input_gives_empty_chunks() {
        let chunks = split_round_robin(Vec::<String>::new(), 3).unwrap();
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(Vec::is_empty));
    }

    #[test]
    fn borrowed_items_are_split_without_cloning() {
        let input = files(4);
        let chunks = split_round_robin(&input, 2).unwrap();
        assert_eq!(chunks[0], vec![&input[0], &input[2]]);
        assert_eq!(chunks[1], vec![&input[1], &input[3]]);
    }

    #[test]
    fn interleaving_reconstructs_input() {
        for len in 1..=40 {
            let input = files(len);
            for n in 1..=len {
                let chunks = split_round_robin(input.clone(), n).unwrap();
                assert_eq!(chunks.len(), n);
                assert_eq!(reassemble(&chunks), input, "len={len} n={n}");

                let sizes: Vec<usize> = chunks.iter().map(Vec::len).collect();
                let max = *sizes.iter().max().unwrap();
                let min = *sizes.iter().min().unwrap();
                assert!(max - min <= 1, "unbalanced split {sizes:?}");
            }
        }
    }

    #[test]
    fn excess_chunks_hold_one_item_each() {
        for len in 0..10 {
            for n in (len + 1)..(len + 5) {
                let chunks = split_round_robin(files(len), n).unwrap();
                assert_eq!(chunks.len(), n);
                assert_eq!(chunks.iter().filter(|c| !c.is_empty()).count(), len);
                assert!(chunks.iter().all(|c| c.len() <= 1));
            }
        }
    }

    #[test]
    fn split_is_deterministic() {
        let input = files(23);
        let a = split_round_robin(input.clone(), 4).unwrap();
        let b = split_round_robin(input, 4).unwrap();
        assert_eq!(a, b);
    }
}
