mod span;

pub use span::{Parse, ParseResult, Position, RawSpan};

use nom::bytes::complete::take_while1;

/// Parses a run of characters that are allowed in identifiers (ids, sensor names, enum names).
pub fn identifier(input: RawSpan<'_>) -> ParseResult<'_, &str> {
    let (input, value) =
        take_while1(|x: char| x.is_alphanumeric() || x == '_' || x == '-' || x == '.')(input)?;
    Ok((input, *value.fragment()))
}

/// Byte column of the first character that could not be parsed.
pub fn error_position(e: &nom::Err<nom::error::Error<RawSpan<'_>>>) -> Option<Position> {
    match e {
        nom::Err::Error(e) | nom::Err::Failure(e) => Some(e.input.into()),
        nom::Err::Incomplete(_) => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use nom_locate::LocatedSpan;
    use test_log::test;

    #[test]
    fn parse_identifier() {
        let (rest, id) = identifier(LocatedSpan::new("sub-1.a_b/rest")).unwrap();
        assert_eq!("sub-1.a_b", id);
        assert_eq!("/rest", *rest.fragment());
    }

    #[test]
    fn error_column() {
        let e = identifier(LocatedSpan::new("/x")).unwrap_err();
        assert_eq!(Some(Position { offset: 1, line: 1 }), error_position(&e));
    }
}
