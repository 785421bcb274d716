use rand::Rng;
use serde::{Deserialize, Serialize};

use super::game::{GamePhase, Team};

/// Characters a room code is drawn from. `I`, `O` and the digits are left
/// out because they are easy to misread on a shared screen.
pub const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ";
pub const ROOM_CODE_LEN: usize = 4;

pub fn generate_room_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..ROOM_CODE_LEN)
        .map(|_| ROOM_CODE_ALPHABET[rng.gen_range(0..ROOM_CODE_ALPHABET.len())] as char)
        .collect()
}

/// Codes are typed by hand, so lookups ignore case and surrounding space.
pub fn normalize_room_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoomSummary {
    pub room_code: String,
    pub phase: GamePhase,
    pub player_count: usize,
    pub round: u32,
    pub winner: Option<Team>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn codes_use_only_the_unambiguous_alphabet() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..1000 {
            let code = generate_room_code(&mut rng);
            assert_eq!(code.len(), ROOM_CODE_LEN);
            assert!(code.bytes().all(|b| ROOM_CODE_ALPHABET.contains(&b)));
            assert!(!code.contains(['I', 'O', '0', '1']));
        }
    }

    #[test]
    fn normalizes_typed_codes() {
        assert_eq!(normalize_room_code(" abcd "), "ABCD");
    }
}
