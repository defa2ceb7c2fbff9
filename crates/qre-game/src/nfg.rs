use super::Cursor;
use super::GameError;
use super::Strategic;
use super::Token;

/// Read a strategic game in `.nfg` text format.
///
/// Both payoff variants are accepted: a flat list of payoffs per contingency
/// (first player fastest, one payoff per player), or a table of named
/// outcomes followed by one outcome index per contingency where 0 stands for
/// the all-zero outcome.
pub fn nfg(text: &str) -> Result<Strategic, GameError> {
    let ref mut cursor = Cursor::new(text)?;
    header(cursor, "NFG")?;
    let players = cursor.texts()?;
    let counts = strategies(cursor)?;
    if counts.len() != players.len() {
        return Err(GameError::structure(format!(
            "{} players but {} strategy sets",
            players.len(),
            counts.len()
        )));
    }
    cursor.maybe_text();
    let contingencies = Strategic::contingencies_of(&counts)?;
    let payoffs = match cursor.at_open() {
        true => outcomes(cursor, players.len(), contingencies)?,
        false => (0..contingencies * players.len())
            .map(|_| cursor.number())
            .collect::<Result<Vec<_>, _>>()?,
    };
    if !cursor.is_done() {
        return Err(GameError::syntax(cursor.line(), "trailing input after payoffs"));
    }
    log::debug!("read strategic game {:?} with strategies {:?}", players, counts);
    Strategic::new(counts, payoffs)
}

/// `<FORMAT> <version> <R|D> "title"`
pub(crate) fn header(cursor: &mut Cursor, format: &str) -> Result<(), GameError> {
    match cursor.next()? {
        Token::Word(w) if w == format => {}
        other => return Err(GameError::Header(other.to_string())),
    }
    let version = cursor.number()?;
    match cursor.word()?.as_str() {
        "R" | "D" => {}
        other => {
            return Err(GameError::syntax(
                cursor.line(),
                format!("unknown number type {} in {} {} header", other, format, version),
            ));
        }
    }
    cursor.text()?;
    Ok(())
}

/// `{ 2 3 }` or `{ { "a" "b" } { "x" "y" "z" } }`
fn strategies(cursor: &mut Cursor) -> Result<Vec<usize>, GameError> {
    cursor.open()?;
    let mut counts = Vec::new();
    while !cursor.at_close() {
        let k = match cursor.at_open() {
            true => cursor.texts()?.len(),
            false => cursor.integer()?,
        };
        if k == 0 {
            return Err(GameError::structure("a player has no strategies"));
        }
        counts.push(k);
    }
    cursor.close()?;
    Ok(counts)
}

/// `{ { "name" u1 u2 … } … }` then one outcome index per contingency.
fn outcomes(cursor: &mut Cursor, players: usize, contingencies: usize) -> Result<Vec<f64>, GameError> {
    cursor.open()?;
    let mut table = vec![vec![0.0; players]];
    while !cursor.at_close() {
        cursor.open()?;
        cursor.maybe_text();
        let mut payoff = Vec::with_capacity(players);
        while !cursor.at_close() {
            payoff.push(cursor.number()?);
        }
        cursor.close()?;
        if payoff.len() != players {
            return Err(GameError::syntax(
                cursor.line(),
                format!("outcome has {} payoffs for {} players", payoff.len(), players),
            ));
        }
        table.push(payoff);
    }
    cursor.close()?;
    let mut payoffs = Vec::new();
    for _ in 0..contingencies {
        let index = cursor.integer()?;
        let outcome = table.get(index).ok_or_else(|| {
            GameError::syntax(cursor.line(), format!("undefined outcome {}", index))
        })?;
        payoffs.extend_from_slice(outcome);
    }
    Ok(payoffs)
}
