//! Given-When-Then harness for reducers
//!
//! Reducers are pure, so most station behavior can be checked without a
//! runtime: give a state, apply one action, inspect the state and the
//! effects that came back.

#![allow(clippy::module_name_repetitions)] // ReducerTest is the natural name

use gatecheck_core::{effect::Effect, reducer::Reducer};

/// Type alias for state assertion functions
type StateAssertion<S> = Box<dyn FnOnce(&S)>;

/// Type alias for effect assertion functions
type EffectAssertion<A> = Box<dyn FnOnce(&[Effect<A>])>;

/// Fluent API for testing reducers
///
/// # Example
///
/// ```ignore
/// use gatecheck_testing::ReducerTest;
///
/// ReducerTest::new(StationReducer::new())
///     .with_env(test_environment())
///     .given_state(StationState::default())
///     .when_action(StationAction::Scan { raw: "T-1".into() })
///     .then_state(|state| assert!(!state.in_flight))
///     .then_effects(|effects| assertions::assert_no_effects(effects))
///     .run();
/// ```
pub struct ReducerTest<R, S, A, E>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    reducer: R,
    environment: Option<E>,
    initial_state: Option<S>,
    action: Option<A>,
    state_assertions: Vec<StateAssertion<S>>,
    effect_assertions: Vec<EffectAssertion<A>>,
}

impl<R, S, A, E> ReducerTest<R, S, A, E>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    /// Create a new reducer test with the given reducer
    #[must_use]
    pub const fn new(reducer: R) -> Self {
        Self {
            reducer,
            environment: None,
            initial_state: None,
            action: None,
            state_assertions: Vec::new(),
            effect_assertions: Vec::new(),
        }
    }

    /// Set the environment for the test
    #[must_use]
    pub fn with_env(mut self, env: E) -> Self {
        self.environment = Some(env);
        self
    }

    /// Set the initial state (Given)
    #[must_use]
    pub fn given_state(mut self, state: S) -> Self {
        self.initial_state = Some(state);
        self
    }

    /// Set the action to apply (When)
    #[must_use]
    pub fn when_action(mut self, action: A) -> Self {
        self.action = Some(action);
        self
    }

    /// Add an assertion about the resulting state (Then)
    #[must_use]
    pub fn then_state<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&S) + 'static,
    {
        self.state_assertions.push(Box::new(assertion));
        self
    }

    /// Add an assertion about the resulting effects (Then)
    #[must_use]
    pub fn then_effects<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&[Effect<A>]) + 'static,
    {
        self.effect_assertions.push(Box::new(assertion));
        self
    }

    /// Run the reducer once and execute all assertions
    ///
    /// # Panics
    ///
    /// Panics if initial state, action, or environment is not set,
    /// or if any assertion fails.
    #[allow(clippy::expect_used)] // Test harness reports misuse loudly
    pub fn run(self) {
        let mut state = self
            .initial_state
            .expect("Initial state must be set with given_state()");
        let action = self.action.expect("Action must be set with when_action()");
        let env = self
            .environment
            .expect("Environment must be set with with_env()");

        let effects = self.reducer.reduce(&mut state, action, &env);

        for assertion in self.state_assertions {
            assertion(&state);
        }
        for assertion in self.effect_assertions {
            assertion(&effects);
        }
    }
}

/// Helper assertions for effects
pub mod assertions {
    use gatecheck_core::effect::Effect;

    /// Assert that the reducer asked for no work
    ///
    /// # Panics
    ///
    /// Panics if any effect other than `Effect::None` is present.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_no_effects<A>(effects: &[Effect<A>]) {
        assert!(
            effects.iter().all(Effect::is_none),
            "Expected no effects, but found {}: {:?}",
            effects.len(),
            effects
        );
    }

    /// Assert that the effects contain at least one `Effect::Future`
    ///
    /// # Panics
    ///
    /// Panics if no Future effect is found.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_has_future_effect<A>(effects: &[Effect<A>]) {
        assert!(
            effects.iter().any(|e| matches!(e, Effect::Future(_))),
            "Expected at least one Future effect, but none found"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatecheck_core::{smallvec, SmallVec};

    #[derive(Clone, Debug)]
    struct TurnstileState {
        admitted: u32,
    }

    #[derive(Clone, Debug)]
    enum TurnstileAction {
        Admit,
        AdmitLater,
    }

    struct TurnstileReducer;

    struct TurnstileEnv;

    impl Reducer for TurnstileReducer {
        type State = TurnstileState;
        type Action = TurnstileAction;
        type Environment = TurnstileEnv;

        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            _env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]> {
            match action {
                TurnstileAction::Admit => {
                    state.admitted += 1;
                    smallvec![Effect::None]
                },
                TurnstileAction::AdmitLater => {
                    smallvec![Effect::future(async { Some(TurnstileAction::Admit) })]
                },
            }
        }
    }

    #[test]
    fn test_state_assertion() {
        ReducerTest::new(TurnstileReducer)
            .with_env(TurnstileEnv)
            .given_state(TurnstileState { admitted: 0 })
            .when_action(TurnstileAction::Admit)
            .then_state(|state| assert_eq!(state.admitted, 1))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_future_effect_assertion() {
        ReducerTest::new(TurnstileReducer)
            .with_env(TurnstileEnv)
            .given_state(TurnstileState { admitted: 3 })
            .when_action(TurnstileAction::AdmitLater)
            .then_state(|state| assert_eq!(state.admitted, 3))
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[test]
    fn test_no_effects_accepts_empty() {
        assertions::assert_no_effects::<TurnstileAction>(&[]);
        assertions::assert_no_effects::<TurnstileAction>(&[Effect::None]);
    }
}
