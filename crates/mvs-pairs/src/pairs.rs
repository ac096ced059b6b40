use std::{
    fmt::Write as _,
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use serde::{Deserialize, Serialize};

use crate::{aggregate::ScoreMatrix, error::ViewSelectionError};

/// Which entries to leave out of a reference view ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingPolicy {
    /// Leave out the source view equal to the reference view.
    pub exclude_self: bool,
    /// Leave out the lowest scoring source view of every ranking, after
    /// `exclude_self` is applied.
    pub drop_lowest: bool,
}

impl Default for RankingPolicy {
    fn default() -> Self {
        Self {
            exclude_self: true,
            drop_lowest: false,
        }
    }
}

/// The ranked source views of one reference view.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewPairs {
    /// The reference view index
    pub reference: usize,
    /// The (source view index, score) pairs, best first
    pub sources: Vec<(usize, f64)>,
}

/// Rank the source views of every reference view by descending score.
///
/// Equal scores keep the order of `src_views`.
///
/// # Arguments
///
/// * `scores` - The [ref_views x src_views] mean score matrix.
/// * `ref_views` - The reference view indices, one per matrix row.
/// * `src_views` - The source view indices, one per matrix column.
/// * `policy` - The entries to leave out.
///
/// # Returns
///
/// One ranking per reference view, in the order of `ref_views`.
pub fn view_selection(
    scores: &ScoreMatrix,
    ref_views: &[usize],
    src_views: &[usize],
    policy: &RankingPolicy,
) -> Result<Vec<ViewPairs>, ViewSelectionError> {
    if scores.shape() != (ref_views.len(), src_views.len()) {
        return Err(ViewSelectionError::ShapeMismatch {
            expected: (ref_views.len(), src_views.len()),
            actual: scores.shape(),
        });
    }

    let rankings = ref_views
        .iter()
        .enumerate()
        .map(|(row, &reference)| {
            let row_scores = scores.row(row);

            let mut order = (0..src_views.len()).collect::<Vec<_>>();
            order.sort_by(|&a, &b| row_scores[b].total_cmp(&row_scores[a]));

            let mut sources = order
                .into_iter()
                .map(|col| (src_views[col], row_scores[col]))
                .filter(|&(src, _)| !(policy.exclude_self && src == reference))
                .collect::<Vec<_>>();

            if policy.drop_lowest {
                sources.pop();
            }

            ViewPairs { reference, sources }
        })
        .collect();

    Ok(rankings)
}

/// Format the rankings as a pair file.
///
/// ```text
/// <N>
/// <ref_view>
/// <K> <src_view> <score> <src_view> <score> ...
/// ```
pub fn format_pair_file(pairs: &[ViewPairs]) -> String {
    let mut out = String::new();
    // writing to a String never fails
    let _ = writeln!(out, "{}", pairs.len());
    for view in pairs {
        let _ = writeln!(out, "{}", view.reference);
        let _ = write!(out, "{}", view.sources.len());
        for (src, score) in &view.sources {
            let _ = write!(out, " {} {:.6}", src, score);
        }
        out.push('\n');
    }
    out
}

/// Write the rankings to a pair file.
///
/// # Arguments
///
/// * `path` - The output file.
/// * `pairs` - The rankings, one per reference view.
pub fn write_pair_file(
    path: impl AsRef<Path>,
    pairs: &[ViewPairs],
) -> Result<(), ViewSelectionError> {
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(format_pair_file(pairs).as_bytes())?;
    writer.flush()?;
    Ok(())
}

/// Read the rankings of a pair file.
pub fn read_pair_file(path: impl AsRef<Path>) -> Result<Vec<ViewPairs>, ViewSelectionError> {
    let contents = std::fs::read_to_string(path)?;
    parse_pair_file(&contents)
}

/// Parse the rankings of a pair file.
pub fn parse_pair_file(contents: &str) -> Result<Vec<ViewPairs>, ViewSelectionError> {
    let mut tokens = contents.split_whitespace();

    let num_views: usize = next_token(&mut tokens, "number of views")?;
    let mut pairs = Vec::with_capacity(num_views);

    for _ in 0..num_views {
        let reference = next_token(&mut tokens, "reference view")?;
        let num_sources: usize = next_token(&mut tokens, "number of source views")?;

        let sources = (0..num_sources)
            .map(|_| -> Result<(usize, f64), ViewSelectionError> {
                Ok((
                    next_token(&mut tokens, "source view")?,
                    next_token(&mut tokens, "score")?,
                ))
            })
            .collect::<Result<Vec<_>, _>>()?;

        pairs.push(ViewPairs { reference, sources });
    }

    if let Some(extra) = tokens.next() {
        return Err(ViewSelectionError::PairFile(format!(
            "unexpected trailing token {extra}"
        )));
    }

    Ok(pairs)
}

fn next_token<'a, T: std::str::FromStr>(
    tokens: &mut impl Iterator<Item = &'a str>,
    what: &str,
) -> Result<T, ViewSelectionError> {
    let token = tokens
        .next()
        .ok_or_else(|| ViewSelectionError::PairFile(format!("missing {what}")))?;
    token
        .parse()
        .map_err(|_| ViewSelectionError::PairFile(format!("invalid {what}: {token}")))
}
