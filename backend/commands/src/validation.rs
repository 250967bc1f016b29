/// Argument validation: check an invocation's flags against the command's
/// schema and coerce them into typed values.
use tracing::debug;

use crate::error::DispatchError;
use crate::registry::CommandDescriptor;
use crate::types::{FlagMap, ParamValue, Params};

/// Validate `params` against `command.args`, returning the coerced values.
///
/// Checks run in a fixed order and the first failure wins:
/// 1. every required flag is present (a flag given with no values counts),
/// 2. then, flag by flag in the order supplied, the flag is declared and
///    one of its accepted types coerces the value.
pub fn validate_args(
    command: &CommandDescriptor,
    params: &FlagMap<ParamValue>,
) -> Result<Params, DispatchError> {
    if let Some(missing) = command.required_args().find(|name| !params.contains(name)) {
        debug!(cmd = %command.name, arg = missing, "Missing required argument");
        return Err(DispatchError::MissingRequiredArgument(missing.to_string()));
    }

    let mut coerced = Params::new();
    for (name, value) in params.iter() {
        let Some(spec) = command.args.get(name) else {
            debug!(cmd = %command.name, arg = name, "Unknown argument");
            return Err(DispatchError::UnknownArgument(name.to_string()));
        };

        let Some(typed) = spec.coerce(value) else {
            debug!(cmd = %command.name, arg = name, value = %value, "Argument type mismatch");
            return Err(DispatchError::TypeMismatch {
                name: name.to_string(),
                accepted: spec.types.clone(),
            });
        };
        coerced.insert(name, typed);
    }

    Ok(coerced)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::handlers::PingHandler;
    use crate::types::{ArgSpec, ArgType, ArgValue, ScalarType};

    fn params(pairs: &[(&str, &[&str])]) -> FlagMap<ParamValue> {
        pairs
            .iter()
            .map(|(k, v)| {
                (*k, ParamValue::from_tokens(v.iter().map(|s| s.to_string()).collect()))
            })
            .collect()
    }

    fn command() -> CommandDescriptor {
        CommandDescriptor::new("cmd", Arc::new(PingHandler))
            .arg("a", ArgSpec::optional([ArgType::STR]))
            .arg("b", ArgSpec::required([ArgType::STR]))
    }

    #[test]
    fn test_missing_required_regardless_of_optional() {
        let cmd = command();
        for p in [params(&[]), params(&[("a", &["x"])])] {
            assert_eq!(
                validate_args(&cmd, &p),
                Err(DispatchError::MissingRequiredArgument("b".into()))
            );
        }
    }

    #[test]
    fn test_flag_with_no_value_counts_as_present() {
        let out = validate_args(&command(), &params(&[("b", &[])])).unwrap();
        assert_eq!(out.get_str("b"), Some(""));
    }

    #[test]
    fn test_missing_required_is_reported_before_unknown_flag() {
        let err = validate_args(&command(), &params(&[("zzz", &["1"])])).unwrap_err();
        assert_eq!(err, DispatchError::MissingRequiredArgument("b".into()));
    }

    #[test]
    fn test_unknown_flag() {
        let err =
            validate_args(&command(), &params(&[("b", &["x"]), ("force", &[])])).unwrap_err();
        assert_eq!(err, DispatchError::UnknownArgument("force".into()));
    }

    #[test]
    fn test_first_failing_flag_wins() {
        let cmd = CommandDescriptor::new("cmd", Arc::new(PingHandler))
            .arg("n", ArgSpec::optional([ArgType::INT]));
        let err =
            validate_args(&cmd, &params(&[("n", &["x"]), ("other", &["1"])])).unwrap_err();
        assert!(matches!(err, DispatchError::TypeMismatch { ref name, .. } if name == "n"));
    }

    #[test]
    fn test_type_mismatch_lists_accepted_types() {
        let cmd = CommandDescriptor::new("cmd", Arc::new(PingHandler))
            .arg("days", ArgSpec::required([ArgType::INT, ArgType::FLOAT]));
        let err = validate_args(&cmd, &params(&[("days", &["soon"])])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "-days has wrong arg type. Accepted types: [int, float]"
        );
    }

    #[test]
    fn test_coerces_with_first_matching_type() {
        let cmd = CommandDescriptor::new("cmd", Arc::new(PingHandler))
            .arg("n", ArgSpec::required([ArgType::INT, ArgType::STR]))
            .arg("ids", ArgSpec::optional([ArgType::List(ScalarType::Int)]));
        let out =
            validate_args(&cmd, &params(&[("n", &["12"]), ("ids", &["1", "2", "3"])])).unwrap();
        assert_eq!(out.get("n"), Some(&ArgValue::Int(12)));
        assert_eq!(out.get_list("ids").map(<[ArgValue]>::len), Some(3));

        let out = validate_args(&cmd, &params(&[("n", &["twelve"])])).unwrap();
        assert_eq!(out.get("n"), Some(&ArgValue::Str("twelve".into())));
    }
}
