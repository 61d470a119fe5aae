// ABOUTME: Integration tests for type-safe identifiers and validated types.
// ABOUTME: Tests parsing, validation, and serialization of names and ids.

use proxyforge::types::*;

mod component_name_tests {
    use super::*;

    #[test]
    fn accepts_contract_style_names() {
        for name in ["governance", "achievementSBT", "fencer-v2", "Tournament_1"] {
            assert_eq!(ComponentName::new(name).unwrap().as_str(), name);
        }
    }

    #[test]
    fn rejects_empty() {
        assert_eq!(ComponentName::new(""), Err(ComponentNameError::Empty));
    }

    #[test]
    fn rejects_leading_digit() {
        assert_eq!(
            ComponentName::new("1fencer"),
            Err(ComponentNameError::InvalidStart)
        );
    }

    #[test]
    fn rejects_dots_and_spaces() {
        assert_eq!(
            ComponentName::new("fencer.v2"),
            Err(ComponentNameError::InvalidChar('.'))
        );
        assert_eq!(
            ComponentName::new("my fencer"),
            Err(ComponentNameError::InvalidChar(' '))
        );
    }

    #[test]
    fn rejects_overlong() {
        let long = "a".repeat(65);
        assert_eq!(ComponentName::new(&long), Err(ComponentNameError::TooLong));
    }

    #[test]
    fn serializes_as_plain_string() {
        let name = ComponentName::new("tournament").unwrap();
        assert_eq!(serde_json::to_string(&name).unwrap(), "\"tournament\"");

        let back: ComponentName = serde_json::from_str("\"tournament\"").unwrap();
        assert_eq!(back, name);
        assert!(serde_json::from_str::<ComponentName>("\"9lives\"").is_err());
    }
}

mod id_tests {
    use super::*;

    #[test]
    fn ids_compare_by_value() {
        assert_eq!(ImplementationId::new("0xabc"), ImplementationId::new("0xabc"));
        assert_ne!(ImplementationId::new("0xabc"), ImplementationId::new("0xabd"));
    }

    #[test]
    fn ids_serialize_transparently() {
        let tx = TxHash::new("0xbeef");
        assert_eq!(serde_json::to_string(&tx).unwrap(), "\"0xbeef\"");
        assert_eq!(tx.to_string(), "0xbeef");
        assert_eq!(tx.into_inner(), "0xbeef");
    }
}
