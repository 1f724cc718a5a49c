use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        DyndashError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        DyndashError::observer("x")
            .to_string()
            .contains("observer error:")
    );
    assert!(
        DyndashError::descriptor("x")
            .to_string()
            .contains("descriptor error:")
    );
    assert!(
        DyndashError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = DyndashError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn json_errors_map_to_serde() {
    let err: DyndashError = serde_json::from_str::<u32>("nope").unwrap_err().into();
    assert!(matches!(err, DyndashError::Serde(_)));
}
