/*!
 * # Toggle pipeline
 *
 * One click on a checklist item runs, synchronously and to completion:
 *
 * 1. **Validation**: the clicked line must be a list item
 * 2. **Resolution**: [`crate::config::resolve`] composes the global default,
 *    the document override and the nearest marker into an `EffectiveConfig`
 * 3. **Scan**: [`crate::scan::scan_peer_group`] finds the peers and subtrees
 * 4. **Rewrite**: [`crate::rewrite::plan_rewrite`] partitions the subtrees and
 *    computes one whole-line splice
 * 5. **Write**: the splice is applied with a single `replace_range`
 *
 * Every failure is logged and reported as [`MutationOutcome::Aborted`]; the
 * buffer is never left half rewritten because the only write is the last step.
 */

use crate::buffer::{LineBuffer, Position};
use crate::config::{self, DocumentMetadata, EffectiveConfig, SortPolicy};
use crate::error::SortError;
use crate::grammar;
use crate::rewrite::{Splice, ToggleMode, plan_rewrite};

/// What a click did to the buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    /// One replacement was written.
    Applied(Splice),
    /// The group was already in order; nothing written.
    Unchanged,
    /// Sorting is off for this click. The host applies its plain toggle.
    Disabled(EffectiveConfig),
    /// Nothing written because of an error.
    Aborted(SortError),
}

impl MutationOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, MutationOutcome::Applied(_))
    }

    pub fn splice(&self) -> Option<&Splice> {
        match self {
            MutationOutcome::Applied(splice) => Some(splice),
            _ => None,
        }
    }
}

impl From<Result<MutationOutcome, SortError>> for MutationOutcome {
    fn from(result: Result<MutationOutcome, SortError>) -> Self {
        result.unwrap_or_else(|error| {
            log::warn!("no mutation: {error}");
            MutationOutcome::Aborted(error)
        })
    }
}

/// Handle a checkbox click on `clicked`: flip it and re-sort its peer group
/// when sorting is enabled for that spot.
pub fn handle_toggle<B, M>(
    buffer: &mut B,
    policy: SortPolicy,
    metadata: &M,
    clicked: usize,
) -> MutationOutcome
where
    B: LineBuffer + ?Sized,
    M: DocumentMetadata + ?Sized,
{
    run_toggle(buffer, policy, metadata, clicked).into()
}

fn run_toggle<B, M>(
    buffer: &mut B,
    policy: SortPolicy,
    metadata: &M,
    clicked: usize,
) -> Result<MutationOutcome, SortError>
where
    B: LineBuffer + ?Sized,
    M: DocumentMetadata + ?Sized,
{
    ensure_list_item(&*buffer, clicked)?;

    let config = config::resolve(policy, metadata.sort_override(), &*buffer, clicked)?;
    if !config.enabled {
        return Ok(MutationOutcome::Disabled(config));
    }

    rewrite(buffer, clicked, ToggleMode::Toggle)
}

/// Re-sort the peer group around `line` without toggling anything.
///
/// This is an explicit request, so configuration is not consulted.
pub fn sort_block<B: LineBuffer + ?Sized>(buffer: &mut B, line: usize) -> MutationOutcome {
    rewrite(buffer, line, ToggleMode::Keep).into()
}

/// Flip the checkbox on `line` and nothing else, as the host does when
/// sorting is disabled.
pub fn toggle_in_place<B: LineBuffer + ?Sized>(buffer: &mut B, line: usize) -> MutationOutcome {
    flip_line(buffer, line).into()
}

fn flip_line<B: LineBuffer + ?Sized>(
    buffer: &mut B,
    line: usize,
) -> Result<MutationOutcome, SortError> {
    let text = ensure_list_item(&*buffer, line)?;
    let toggled = grammar::toggle_checkbox(&text).ok_or(SortError::NotATask { line })?;

    let splice = Splice {
        lines: line..line + 1,
        from: Position::line_start(line),
        to: Position::new(line, text.len()),
        text: toggled,
    };
    splice.apply(buffer)?;
    Ok(MutationOutcome::Applied(splice))
}

/// Re-sort every peer group in the document whose effective configuration
/// is enabled. Returns the number of rewrites.
///
/// Sorting one group can move a nested group past lines already visited, so
/// passes repeat until one makes no change.
pub fn sort_document<B, M>(
    buffer: &mut B,
    policy: SortPolicy,
    metadata: &M,
) -> Result<usize, SortError>
where
    B: LineBuffer + ?Sized,
    M: DocumentMetadata + ?Sized,
{
    let document_override = metadata.sort_override();
    let mut rewrites = 0;

    for _ in 0..=buffer.line_count() {
        let mut changed = false;

        for line in 0..buffer.line_count() {
            if !grammar::is_list_item(&buffer.line(line)?) {
                continue;
            }
            if !config::resolve(policy, document_override, &*buffer, line)?.enabled {
                continue;
            }
            if let Some(splice) = plan_rewrite(&*buffer, line, ToggleMode::Keep)? {
                splice.apply(buffer)?;
                rewrites += 1;
                changed = true;
            }
        }

        if !changed {
            break;
        }
    }

    log::info!("sorted document with {rewrites} rewrites");
    Ok(rewrites)
}

fn ensure_list_item<B: LineBuffer + ?Sized>(buffer: &B, line: usize) -> Result<String, SortError> {
    let text = buffer.line(line)?;
    if !grammar::is_list_item(&text) {
        return Err(SortError::NotAListItem { line });
    }
    Ok(text)
}

fn rewrite<B: LineBuffer + ?Sized>(
    buffer: &mut B,
    line: usize,
    mode: ToggleMode,
) -> Result<MutationOutcome, SortError> {
    match plan_rewrite(&*buffer, line, mode)? {
        Some(splice) => {
            splice.apply(buffer)?;
            log::info!("rewrote lines {:?} for line {line}", splice.lines);
            Ok(MutationOutcome::Applied(splice))
        }
        None => Ok(MutationOutcome::Unchanged),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::{BufferError, RopeBuffer};
    use crate::config::{ConfigSource, DISABLE_MARKER, ENABLE_MARKER, Frontmatter};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn buffer(lines: &[&str]) -> RopeBuffer {
        RopeBuffer::from(lines.join("\n").as_str())
    }

    /// Rejects every write, like a host whose transaction failed.
    struct ReadOnly(RopeBuffer);

    impl LineBuffer for ReadOnly {
        fn line_count(&self) -> usize {
            self.0.line_count()
        }

        fn line(&self, index: usize) -> Result<String, BufferError> {
            self.0.line(index)
        }

        fn range_text(&self, from: Position, to: Position) -> Result<String, BufferError> {
            self.0.range_text(from, to)
        }

        fn replace_range(&mut self, _: Position, _: Position, _: &str) -> Result<(), BufferError> {
            Err(BufferError::ReadOnly)
        }
    }

    const GROCERIES: [&str; 3] = ["- [ ] Buy milk", "- [ ] Get gas", "- [x] Bread"];

    #[test]
    fn test_click_sorts_group() {
        let mut doc = buffer(&GROCERIES);

        let outcome = handle_toggle(&mut doc, SortPolicy::default(), &None::<bool>, 0);

        assert!(outcome.is_applied());
        assert_eq!(doc.lines(), vec!["- [ ] Get gas", "- [x] Buy milk", "- [x] Bread"]);
        assert_eq!(doc.version(), 1);
    }

    #[rstest]
    #[case::global(vec![], false, None, ConfigSource::Global)]
    #[case::frontmatter(vec![], true, Some(false), ConfigSource::Frontmatter)]
    #[case::marker(vec![DISABLE_MARKER], true, Some(true), ConfigSource::ListMarker)]
    fn test_disabled_click_never_writes(
        #[case] prefix: Vec<&str>,
        #[case] global: bool,
        #[case] document_override: Option<bool>,
        #[case] source: ConfigSource,
    ) {
        let lines: Vec<&str> = prefix.into_iter().chain(GROCERIES).collect();
        let clicked = lines.len() - 3;
        let mut doc = buffer(&lines);

        let outcome = handle_toggle(
            &mut doc,
            SortPolicy::new(global),
            &document_override,
            clicked,
        );

        assert_eq!(
            outcome,
            MutationOutcome::Disabled(EffectiveConfig {
                enabled: false,
                source
            })
        );
        assert_eq!(doc.version(), 0);
    }

    #[test]
    fn test_marker_overrides_frontmatter_and_global() {
        let mut doc = buffer(&[
            "---",
            "sort-checklist: false",
            "---",
            ENABLE_MARKER,
            "- [ ] Buy milk",
            "- [ ] Get gas",
        ]);
        let frontmatter = Frontmatter::from_buffer(&doc);
        assert_eq!(frontmatter.sort_override(), Some(false));

        let outcome = handle_toggle(&mut doc, SortPolicy::new(true), &frontmatter, 4);

        assert!(outcome.is_applied());
        assert_eq!(doc.line(4).unwrap(), "- [ ] Get gas");
        assert_eq!(doc.line(5).unwrap(), "- [x] Buy milk");
    }

    #[test]
    fn test_non_list_click_aborts() {
        let mut doc = buffer(&["Heading", "- [ ] a"]);

        let outcome = handle_toggle(&mut doc, SortPolicy::default(), &None::<bool>, 0);

        assert_eq!(outcome, MutationOutcome::Aborted(SortError::NotAListItem { line: 0 }));
        assert_eq!(doc.version(), 0);
    }

    #[test]
    fn test_out_of_range_click_aborts() {
        let mut doc = buffer(&["- [ ] a"]);

        let outcome = handle_toggle(&mut doc, SortPolicy::default(), &None::<bool>, 3);

        assert!(matches!(
            outcome,
            MutationOutcome::Aborted(SortError::Buffer(BufferError::LineOutOfRange { .. }))
        ));
    }

    #[test]
    fn test_rejected_write_aborts() {
        let mut doc = ReadOnly(buffer(&GROCERIES));

        let outcome = handle_toggle(&mut doc, SortPolicy::default(), &None::<bool>, 0);

        assert_eq!(
            outcome,
            MutationOutcome::Aborted(SortError::Replace(BufferError::ReadOnly))
        );
        assert_eq!(doc.0.lines(), GROCERIES);
    }

    #[test]
    fn test_sort_block_twice_writes_once() {
        let mut doc = buffer(&["- [x] a", "- [ ] b"]);

        assert!(sort_block(&mut doc, 0).is_applied());
        assert_eq!(sort_block(&mut doc, 0), MutationOutcome::Unchanged);
        assert_eq!(doc.lines(), vec!["- [ ] b", "- [x] a"]);
        assert_eq!(doc.version(), 1);
    }

    #[test]
    fn test_toggle_in_place_only_flips() {
        let mut doc = buffer(&["- [ ] a", "- [ ] b", "- [x] c"]);

        let outcome = toggle_in_place(&mut doc, 0);

        assert_eq!(outcome.splice().map(|s| s.lines.clone()), Some(0..1));
        assert_eq!(doc.lines(), vec!["- [x] a", "- [ ] b", "- [x] c"]);
    }

    #[test]
    fn test_toggle_in_place_needs_checkbox() {
        let mut doc = buffer(&["- plain"]);

        assert_eq!(
            toggle_in_place(&mut doc, 0),
            MutationOutcome::Aborted(SortError::NotATask { line: 0 })
        );
    }

    #[test]
    fn test_sort_document_reaches_nested_groups() {
        let mut doc = buffer(&[
            "- [x] done parent",
            "  - [x] c1",
            "  - [ ] c2",
            "- [ ] open parent",
            "  - [x] d1",
            "  - [ ] d2",
            "",
            DISABLE_MARKER,
            "- [x] untouched",
            "- [ ] list",
        ]);

        let rewrites = sort_document(&mut doc, SortPolicy::default(), &None::<bool>).unwrap();

        assert_eq!(
            doc.lines(),
            vec![
                "- [ ] open parent",
                "  - [ ] d2",
                "  - [x] d1",
                "- [x] done parent",
                "  - [ ] c2",
                "  - [x] c1",
                "",
                DISABLE_MARKER,
                "- [x] untouched",
                "- [ ] list",
            ]
        );
        assert_eq!(rewrites, 3);
        assert_eq!(sort_document(&mut doc, SortPolicy::default(), &None::<bool>).unwrap(), 0);
    }

    #[test]
    fn test_sort_document_respects_global_off() {
        let mut doc = buffer(&["- [x] a", "- [ ] b"]);

        let rewrites = sort_document(&mut doc, SortPolicy::new(false), &None::<bool>).unwrap();

        assert_eq!(rewrites, 0);
        assert_eq!(doc.version(), 0);
    }
}
