//! Environment overrides live in their own test binary: env vars are process-global

use std::env;

use treeselect::config::Settings;

#[test]
fn given_env_overrides_when_loading_then_env_wins() {
    env::set_var("TREESELECT_SELECTOR__MULTIPLE", "true");
    env::set_var("TREESELECT_SELECTOR__UNFOLDED_LEVEL", "2");

    let settings = Settings::load(None).unwrap();

    env::remove_var("TREESELECT_SELECTOR__MULTIPLE");
    env::remove_var("TREESELECT_SELECTOR__UNFOLDED_LEVEL");
    assert!(settings.selector.multiple);
    assert_eq!(settings.selector.unfolded_level, 2);
}
