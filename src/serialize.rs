//! The self-delimiting text format used to save and load a game.
//!
//! This mirrors the reference engine's hand-rolled reader/writer: field
//! order is fixed rather than schema-flexible, objects are wrapped in
//! `{}`, lists in `[]`, and fields are separated by `,`. There is no
//! general-purpose value type; each function reads exactly the fields
//! its corresponding writer produced, in the same order.

use crate::board::{Game, PlayMode};
use crate::die::{Color, Die};
use crate::engine::Strategy;
use crate::error::KbxError;
use crate::moves::{Move, RelativeMove};

fn mode_to_i(mode: PlayMode) -> i64 {
    match mode {
        PlayMode::HumanHuman => 0,
        PlayMode::HumanAi => 1,
        PlayMode::AiHuman => 2,
    }
}

fn mode_from_i(n: i64) -> Result<PlayMode, KbxError> {
    match n {
        0 => Ok(PlayMode::HumanHuman),
        1 => Ok(PlayMode::HumanAi),
        2 => Ok(PlayMode::AiHuman),
        _ => Err(KbxError::MalformedNumber {
            key: "mode".to_string(),
            value: n.to_string(),
        }),
    }
}

fn color_to_i(color: Color) -> i64 {
    match color {
        Color::White => 1,
        Color::Black => -1,
        Color::None => 0,
    }
}

fn color_from_i(n: i64) -> Result<Color, KbxError> {
    match n {
        1 => Ok(Color::White),
        -1 => Ok(Color::Black),
        0 => Ok(Color::None),
        _ => Err(KbxError::MalformedNumber {
            key: "col".to_string(),
            value: n.to_string(),
        }),
    }
}

fn write_list<T>(items: &[T], mut item: impl FnMut(&T) -> String) -> String {
    let parts: Vec<String> = items.iter().map(|x| item(x)).collect();
    format!("[{}]", parts.join(","))
}

fn write_die(die: &Die) -> String {
    format!(
        "{{x:{},y:{},col:{},fS:{},cS:{}}}",
        die.x,
        die.y,
        color_to_i(die.color),
        die.former,
        die.current
    )
}

fn write_relative_move(rel: &RelativeMove) -> String {
    format!(
        "{{dx:{},dy:{},fX:{}}}",
        rel.dx,
        rel.dy,
        if rel.first_x { 1 } else { 0 }
    )
}

fn write_move(mv: &Move) -> String {
    format!(
        "{{idx:{},rel:{}}}",
        mv.die_index,
        write_relative_move(&mv.rel)
    )
}

fn write_opt_usize(victim: &Option<usize>) -> String {
    match victim {
        Some(i) => i.to_string(),
        None => "-1".to_string(),
    }
}

fn write_strategy(strategy: &Strategy) -> String {
    format!(
        "{{name:\"{}\",coeffDR:{},pat:{}}}",
        strategy.name, strategy.coeff_dice_ratio, strategy.patience
    )
}

/// Render `game` to its self-delimiting text form.
pub fn serialize_game(game: &Game) -> String {
    format!(
        "{{mode:{},next:{},aiDepth:{},aiStrategy:{},dice:{},history:{{moves:{},deaths:{},movesPending:{},deathsPending:{}}}}}",
        mode_to_i(game.mode),
        color_to_i(game.next_player),
        game.ai_depth,
        write_strategy(&game.strategy),
        write_list(&game.dice, write_die),
        write_list(&game.move_stack, write_move),
        write_list(&game.death_stack, write_opt_usize),
        write_list(&game.move_stack_pending, write_move),
        write_list(&game.death_stack_pending, write_opt_usize),
    )
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(input: &'a str) -> Self {
        Reader {
            bytes: input.as_bytes(),
            pos: 0,
        }
    }

    fn skip_ws(&mut self) {
        while self.pos < self.bytes.len() && (self.bytes[self.pos] as char).is_whitespace() {
            self.pos += 1;
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.skip_ws();
        self.bytes.get(self.pos).map(|&b| b as char)
    }

    fn expect_char(&mut self, c: char) -> Result<(), KbxError> {
        self.skip_ws();
        if self.bytes.get(self.pos).map(|&b| b as char) == Some(c) {
            self.pos += 1;
            Ok(())
        } else {
            Err(KbxError::UnexpectedEof)
        }
    }

    fn maybe_comma(&mut self) {
        if self.peek() == Some(',') {
            self.pos += 1;
        }
    }

    fn read_raw_key(&mut self) -> Result<String, KbxError> {
        self.skip_ws();
        let start = self.pos;
        while self.pos < self.bytes.len() && self.bytes[self.pos] as char != ':' {
            self.pos += 1;
        }
        if self.pos >= self.bytes.len() {
            return Err(KbxError::UnexpectedEof);
        }
        let key = std::str::from_utf8(&self.bytes[start..self.pos])
            .unwrap_or("")
            .trim()
            .to_string();
        self.pos += 1;
        Ok(key)
    }

    fn expect_key(&mut self, expected: &str) -> Result<(), KbxError> {
        let key = self.read_raw_key()?;
        if key != expected {
            return Err(KbxError::UnknownKey(key));
        }
        Ok(())
    }

    fn read_token(&mut self) -> Result<String, KbxError> {
        self.skip_ws();
        let start = self.pos;
        while self.pos < self.bytes.len() {
            let c = self.bytes[self.pos] as char;
            if c == ',' || c == '}' || c == ']' {
                break;
            }
            self.pos += 1;
        }
        if start == self.pos {
            return Err(KbxError::UnexpectedEof);
        }
        Ok(std::str::from_utf8(&self.bytes[start..self.pos])
            .unwrap_or("")
            .trim()
            .to_string())
    }

    fn read_i64(&mut self) -> Result<i64, KbxError> {
        let tok = self.read_token()?;
        tok.parse::<i64>().map_err(|_| KbxError::MalformedNumber {
            key: "int".to_string(),
            value: tok,
        })
    }

    fn read_f64(&mut self) -> Result<f64, KbxError> {
        let tok = self.read_token()?;
        tok.parse::<f64>().map_err(|_| KbxError::MalformedNumber {
            key: "float".to_string(),
            value: tok,
        })
    }

    fn read_quoted(&mut self) -> Result<String, KbxError> {
        self.expect_char('"')?;
        let start = self.pos;
        while self.pos < self.bytes.len() && self.bytes[self.pos] as char != '"' {
            self.pos += 1;
        }
        if self.pos >= self.bytes.len() {
            return Err(KbxError::UnexpectedEof);
        }
        let s = std::str::from_utf8(&self.bytes[start..self.pos])
            .unwrap_or("")
            .to_string();
        self.pos += 1;
        Ok(s)
    }
}

fn read_list<T>(
    r: &mut Reader,
    mut item: impl FnMut(&mut Reader) -> Result<T, KbxError>,
) -> Result<Vec<T>, KbxError> {
    r.expect_char('[')?;
    let mut out = Vec::new();
    if r.peek() == Some(']') {
        r.pos += 1;
        return Ok(out);
    }
    loop {
        out.push(item(r)?);
        match r.peek() {
            Some(',') => {
                r.pos += 1;
            }
            Some(']') => {
                r.pos += 1;
                break;
            }
            _ => return Err(KbxError::UnexpectedEof),
        }
    }
    Ok(out)
}

fn read_die(r: &mut Reader) -> Result<Die, KbxError> {
    r.expect_char('{')?;
    r.expect_key("x")?;
    let x = r.read_i64()? as i32;
    r.maybe_comma();
    r.expect_key("y")?;
    let y = r.read_i64()? as i32;
    r.maybe_comma();
    r.expect_key("col")?;
    let color = color_from_i(r.read_i64()?)?;
    r.maybe_comma();
    r.expect_key("fS")?;
    let former = r.read_i64()? as i32;
    r.maybe_comma();
    r.expect_key("cS")?;
    let current = r.read_i64()? as u8;
    r.expect_char('}')?;
    Ok(Die {
        x,
        y,
        color,
        former,
        current,
    })
}

fn read_relative_move(r: &mut Reader) -> Result<RelativeMove, KbxError> {
    r.expect_char('{')?;
    r.expect_key("dx")?;
    let dx = r.read_i64()? as i32;
    r.maybe_comma();
    r.expect_key("dy")?;
    let dy = r.read_i64()? as i32;
    r.maybe_comma();
    r.expect_key("fX")?;
    let first_x = r.read_i64()? != 0;
    r.expect_char('}')?;
    Ok(RelativeMove::new(dx, dy, first_x))
}

fn read_move(r: &mut Reader) -> Result<Move, KbxError> {
    r.expect_char('{')?;
    r.expect_key("idx")?;
    let die_index = r.read_i64()? as usize;
    r.maybe_comma();
    r.expect_key("rel")?;
    let rel = read_relative_move(r)?;
    r.expect_char('}')?;
    Ok(Move::new(die_index, rel))
}

fn read_opt_usize(r: &mut Reader) -> Result<Option<usize>, KbxError> {
    let n = r.read_i64()?;
    if n < 0 {
        Ok(None)
    } else {
        Ok(Some(n as usize))
    }
}

fn read_strategy(r: &mut Reader) -> Result<Strategy, KbxError> {
    r.expect_char('{')?;
    r.expect_key("name")?;
    let name = r.read_quoted()?;
    r.maybe_comma();
    r.expect_key("coeffDR")?;
    let coeff_dice_ratio = r.read_f64()?;
    r.maybe_comma();
    r.expect_key("pat")?;
    let patience = r.read_f64()?;
    r.expect_char('}')?;
    Ok(Strategy {
        name,
        coeff_dice_ratio,
        patience,
    })
}

/// Parse a game previously produced by `serialize_game`.
///
/// The board grid is not stored directly — it is rebuilt from each
/// live die's `(x, y)`, mirroring the fact that the grid is derived
/// state, never the source of truth.
pub fn deserialize_game(input: &str) -> Result<Game, KbxError> {
    let mut r = Reader::new(input);
    r.expect_char('{')?;
    r.expect_key("mode")?;
    let mode = mode_from_i(r.read_i64()?)?;
    r.maybe_comma();
    r.expect_key("next")?;
    let next = color_from_i(r.read_i64()?)?;
    r.maybe_comma();
    r.expect_key("aiDepth")?;
    let ai_depth = r.read_i64()? as u32;
    r.maybe_comma();
    r.expect_key("aiStrategy")?;
    let strategy = read_strategy(&mut r)?;
    r.maybe_comma();
    r.expect_key("dice")?;
    let dice_vec = read_list(&mut r, read_die)?;
    if dice_vec.len() != 18 {
        return Err(KbxError::MalformedNumber {
            key: "dice".to_string(),
            value: dice_vec.len().to_string(),
        });
    }
    r.maybe_comma();
    r.expect_key("history")?;
    r.expect_char('{')?;
    r.expect_key("moves")?;
    let moves = read_list(&mut r, read_move)?;
    r.maybe_comma();
    r.expect_key("deaths")?;
    let deaths = read_list(&mut r, read_opt_usize)?;
    r.maybe_comma();
    r.expect_key("movesPending")?;
    let moves_pending = read_list(&mut r, read_move)?;
    r.maybe_comma();
    r.expect_key("deathsPending")?;
    let deaths_pending = read_list(&mut r, read_opt_usize)?;
    r.expect_char('}')?;
    r.expect_char('}')?;

    let mut game = Game::new(mode, ai_depth, strategy);
    for (i, die) in dice_vec.into_iter().enumerate() {
        game.dice[i] = die;
    }
    game.next_player = next;
    game.move_stack = moves;
    game.death_stack = deaths;
    game.move_stack_pending = moves_pending;
    game.death_stack_pending = deaths_pending;

    game.grid = [[None; 9]; 9];
    for (i, die) in game.dice.iter().enumerate() {
        if !die.got_killed() {
            game.grid[die.x as usize][die.y as usize] = Some(i);
        }
    }
    Ok(game)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::PlayMode;

    #[test]
    fn round_trips_default_game() {
        let game = Game::default();
        let text = serialize_game(&game);
        let back = deserialize_game(&text).expect("should parse");
        assert_eq!(back, game);
    }

    #[test]
    fn round_trips_after_a_move_and_undo() {
        let mut game = Game::default();
        let mv = game.legal_moves_for(0).unwrap()[0];
        game.make_move(&mv, true).unwrap();
        let text = serialize_game(&game);
        let back = deserialize_game(&text).expect("should parse");
        assert_eq!(back, game);
        assert_eq!(back.move_stack.len(), 1);
    }

    #[test]
    fn unknown_key_is_reported() {
        let bad = "{mood:0,next:1,aiDepth:2,aiStrategy:{name:\"x\",coeffDR:1,pat:1},dice:[],history:{moves:[],deaths:[],movesPending:[],deathsPending:[]}}";
        let err = deserialize_game(bad).unwrap_err();
        assert_eq!(err, KbxError::UnknownKey("mood".to_string()));
    }

    #[test]
    fn malformed_number_is_reported() {
        let bad = "{mode:oops,next:1,aiDepth:2,aiStrategy:{name:\"x\",coeffDR:1,pat:1},dice:[],history:{moves:[],deaths:[],movesPending:[],deathsPending:[]}}";
        let err = deserialize_game(bad).unwrap_err();
        assert!(matches!(err, KbxError::MalformedNumber { .. }));
    }

    #[test]
    fn strategy_round_trips_through_game() {
        let mut game = Game::default();
        game.strategy = Strategy {
            name: "aggressive".to_string(),
            coeff_dice_ratio: 2.5,
            patience: 0.8,
        };
        let text = serialize_game(&game);
        let back = deserialize_game(&text).unwrap();
        assert_eq!(back.strategy, game.strategy);
    }

    #[test]
    fn mode_round_trips() {
        let game = Game::new(PlayMode::AiHuman, 3, Strategy::default());
        let text = serialize_game(&game);
        let back = deserialize_game(&text).unwrap();
        assert_eq!(back.mode, PlayMode::AiHuman);
        assert_eq!(back.ai_depth, 3);
    }
}
