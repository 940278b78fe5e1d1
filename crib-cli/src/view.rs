use crib_core::matching::{Match, MatchStatus};
use crib_core::workspace::Workspace;

/// Printable stand-in for a decoded byte: control pictures for C0 controls,
/// the character itself for printable ASCII, `.` for anything else.
pub(crate) fn char_for_byte(b: u8) -> char {
    match b {
        0x00..=0x1f => char::from_u32(0x2400 | u32::from(b)).unwrap_or('.'),
        0x20..=0x7e => char::from(b),
        _ => '.',
    }
}

pub(crate) fn render_bytes(bytes: &[u8]) -> String {
    bytes.iter().copied().map(char_for_byte).collect()
}

pub(crate) fn describe_match(n: usize, m: &Match) -> String {
    let line = format!(
        "[{n}] {:?} ciphertext {} at {}  key {}",
        String::from_utf8_lossy(&m.crib),
        m.ciphertext_index,
        m.start,
        hex::encode(&m.key)
    );
    if m.status == MatchStatus::Confirmed {
        line
    } else {
        format!("{line}  score {:.2}", m.score)
    }
}

pub(crate) fn print_pending(workspace: &Workspace) {
    let possible: Vec<&Match> = crate::possible_matches(workspace);
    if possible.is_empty() {
        if workspace.crib().is_empty() {
            println!("No crib set.");
        } else {
            println!("No possible matches. Use 'place' to position the crib by hand.");
        }
        return;
    }
    println!("Possible matches:");
    for m in possible {
        println!("  {}", describe_match(m.rank, m));
    }
}

pub(crate) fn print_decoded(workspace: &Workspace) {
    let key = workspace.key();
    println!("Key: {}", hex::encode(&key));
    for (i, row) in workspace.decoded().iter().enumerate() {
        println!("{i:>3}: {}", render_bytes(row));
    }
}
