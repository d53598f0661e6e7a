//! Mock construction helpers

use mockall::mock;
use plyr_rs::{Backend, ContextKind, Result, TypeKey, Value, VerbArgs};

mock! {
    /// Backend whose every answer is scripted by the test.
    pub Backend {}

    impl Backend for Backend {
        fn name(&self) -> String;
        fn owns(&self) -> Vec<TypeKey>;
        fn priority(&self) -> i32;
        fn verbs(&self) -> Vec<String>;
        fn context(&self, verb: &str) -> ContextKind;
        fn call(&self, verb: &str, args: VerbArgs) -> Result<Value>;
    }
}

/// Mock that describes itself as `name`, owning `owns` with one verb.
///
/// `call` expectations are left to the test.
pub fn described_mock(name: &str, owns: TypeKey, priority: i32, verb: &str) -> MockBackend {
    let mut mock = MockBackend::new();
    let name = name.to_string();
    let verb = verb.to_string();
    mock.expect_name().return_const(name);
    mock.expect_owns().returning(move || vec![owns.clone()]);
    mock.expect_priority().return_const(priority);
    mock.expect_verbs().returning(move || vec![verb.clone()]);
    mock.expect_context().return_const(ContextKind::Eval);
    mock
}
