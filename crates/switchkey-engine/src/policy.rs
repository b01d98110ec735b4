use mac_activate::AppId;

/// How the tap should handle a key-down event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Decision {
    /// Forward the event unmodified to the foreground application.
    Forward,
    /// Suppress the event and activate the candidate at this index.
    Activate(usize),
}

/// Classify a key-down event against the switch modifier and the candidate
/// list for its key position.
///
/// - With the switch modifier up, or no candidates, the event is forwarded:
///   an unrecognized combination stays an ordinary shortcut for the
///   foreground app. Other held modifiers play no role.
/// - Otherwise the next candidate index is selected: a missing cursor, or a
///   cursor whose candidate has left the list, restarts at index 0 (a stale
///   cursor is treated exactly like a fresh key); a live cursor advances one
///   step, wrapping around.
///
/// The returned index is always in bounds for `candidates`. Total and
/// infallible; the caller commits the cursor before the event callback
/// returns.
pub(crate) fn classify(
    switch_held: bool,
    candidates: &[AppId],
    cursor: Option<&AppId>,
) -> Decision {
    if !switch_held || candidates.is_empty() {
        return Decision::Forward;
    }
    let idx = match cursor.and_then(|cur| candidates.iter().position(|c| c == cur)) {
        Some(i) => (i + 1) % candidates.len(),
        None => 0,
    };
    Decision::Activate(idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<AppId> {
        names.iter().map(|n| AppId::from(*n)).collect()
    }

    #[test]
    fn modifier_up_forwards_regardless_of_candidates() {
        let list = ids(&["com.a", "com.b"]);
        assert_eq!(classify(false, &list, None), Decision::Forward);
        assert_eq!(
            classify(false, &list, Some(&AppId::from("com.a"))),
            Decision::Forward
        );
    }

    #[test]
    fn no_candidates_forwards() {
        assert_eq!(classify(true, &[], None), Decision::Forward);
    }

    #[test]
    fn first_press_selects_index_zero() {
        let list = ids(&["com.a", "com.b", "com.c"]);
        assert_eq!(classify(true, &list, None), Decision::Activate(0));
    }

    #[test]
    fn live_cursor_advances_and_wraps() {
        let list = ids(&["com.a", "com.b", "com.c"]);
        let a = AppId::from("com.a");
        let c = AppId::from("com.c");
        assert_eq!(classify(true, &list, Some(&a)), Decision::Activate(1));
        assert_eq!(classify(true, &list, Some(&c)), Decision::Activate(0));
    }

    #[test]
    fn stale_cursor_resets_to_zero() {
        let list = ids(&["com.a", "com.b"]);
        let gone = AppId::from("com.gone");
        assert_eq!(classify(true, &list, Some(&gone)), Decision::Activate(0));
    }

    #[test]
    fn single_candidate_never_cycles() {
        let list = ids(&["com.pinned"]);
        let pinned = AppId::from("com.pinned");
        assert_eq!(classify(true, &list, None), Decision::Activate(0));
        assert_eq!(classify(true, &list, Some(&pinned)), Decision::Activate(0));
    }
}
