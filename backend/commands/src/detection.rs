/// Command detection: recognise `<prefix><name> -flag value ...` in
/// inbound messages.
use crate::registry::Registry;
use crate::types::{FlagMap, Invocation, ParamValue};

/// Default prefix token that starts every invocation.
pub const DEFAULT_PREFIX: &str = ">>";

/// Marks the start of a flag in the argument text.
pub const FLAG_MARKER: char = '-';

/// Detect a command invocation in a raw message.
///
/// Returns `None` for ordinary chat: no prefix, nothing after the prefix,
/// or a name the registry does not know. Unknown names are ignored rather
/// than reported so the bot stays quiet on accidental prefix collisions.
///
/// Text between the command name and the first flag is dropped, so
/// `>>kick alice -reason spam` never sees `alice`.
pub fn detect_command(text: &str, prefix: &str, registry: &Registry) -> Option<Invocation> {
    let rest = text.strip_prefix(prefix)?;
    if rest.is_empty() {
        return None;
    }

    // The name runs up to the first whitespace; a leading space yields an
    // empty name, which no registry contains.
    let (name, args) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
    if !registry.contains(name) {
        return None;
    }

    Some(Invocation {
        name: name.to_string(),
        params: parse_flags(args),
    })
}

/// Split argument text into flags and their whitespace-delimited values.
fn parse_flags(args: &str) -> FlagMap<ParamValue> {
    let mut params = FlagMap::new();

    for segment in args.split(FLAG_MARKER).skip(1) {
        let mut tokens = segment.split_whitespace();
        // A bare `-` still introduces a (nameless) flag.
        let flag = tokens.next().unwrap_or_default();
        let values: Vec<String> = tokens.map(str::to_string).collect();
        params.insert(flag, ParamValue::from_tokens(values));
    }

    params
}
