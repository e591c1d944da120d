//! Text rendering of the edit history.

use rewind_core::EditLog;

/// Renders the history with undone entries on top, the cursor marker, then
/// done entries, most recent first. Entry indices are what `jump` takes.
pub fn render_history(log: &EditLog) -> String {
    let entries = log.entries();
    let undo_count = entries.iter().filter(|e| e.done && e.significant).count();
    let redo_count = entries.iter().filter(|e| !e.done && e.significant).count();

    let mut lines = vec![
        format!("Undo: {undo_count} | Redo: {redo_count}"),
        format!("{} / {}", log.undo_label(), log.redo_label()),
    ];

    let (done, undone): (Vec<_>, Vec<_>) = entries.iter().partition(|e| e.done);
    let line = |tag: &str, entry: &rewind_core::HistoryEntry| {
        let tag = if entry.significant { tag } else { "----" };
        format!("  [{}] {tag} {}", entry.index, entry.description)
    };

    // Next to redo sits right above the cursor.
    for &entry in undone.iter().rev() {
        lines.push(line("REDO", entry));
    }
    lines.push("  > current".to_string());
    for &entry in done.iter().rev() {
        lines.push(line("UNDO", entry));
    }
    lines.join("\n")
}
