//! Gate position → command letter.

use gatenav_types::NavCommand;

/// Map a horizontal gate position onto `'A'..='Z'`.
///
/// The frame is split into 26 equal columns.  Positions at or beyond the
/// right edge saturate at `'Z'`; positions left of the frame saturate at
/// `'A'`.
pub fn gate_letter(center_x: f64, frame_width: f64) -> char {
    let index = (center_x / frame_width * 26.0).floor();
    // `as` saturates and maps NaN to 0.
    let index = (index as i64).clamp(0, 25) as u8;
    (b'A' + index) as char
}

/// Gate command for `letter`, lower-cased after an odd number of passes.
pub fn encode_gate(letter: char, odd_passes: bool) -> NavCommand {
    if odd_passes {
        NavCommand::Gate(letter.to_ascii_lowercase())
    } else {
        NavCommand::Gate(letter.to_ascii_uppercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn left_edge_is_a() {
        assert_eq!(gate_letter(0.0, 640.0), 'A');
        assert_eq!(gate_letter(24.0, 640.0), 'A');
    }

    #[test]
    fn columns_are_floored() {
        // 640 / 26 ≈ 24.6 px per column.
        assert_eq!(gate_letter(25.0, 640.0), 'B');
        assert_eq!(gate_letter(320.0, 640.0), 'N');
        assert_eq!(gate_letter(639.0, 640.0), 'Z');
    }

    #[test]
    fn right_edge_and_beyond_saturate_at_z() {
        assert_eq!(gate_letter(640.0, 640.0), 'Z');
        assert_eq!(gate_letter(10_000.0, 640.0), 'Z');
        assert_eq!(gate_letter(f64::INFINITY, 640.0), 'Z');
    }

    #[test]
    fn negative_positions_saturate_at_a() {
        assert_eq!(gate_letter(-5.0, 640.0), 'A');
        assert_eq!(gate_letter(f64::NAN, 640.0), 'A');
    }

    #[test]
    fn case_follows_pass_parity() {
        assert_eq!(encode_gate('Q', false), NavCommand::Gate('Q'));
        assert_eq!(encode_gate('Q', true), NavCommand::Gate('q'));
        assert_eq!(encode_gate('Z', true).to_byte(), b'z');
    }
}
