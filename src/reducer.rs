use crate::Effect;

/// Pure transition: mutate `state` for `action`, return the effects to run.
pub trait Reducer<State, Action: Send + 'static, Environment> {
    fn reduce(&self, state: &mut State, action: Action, env: &Environment) -> Vec<Effect<Action>>;
}

impl<State, Action, Environment, F> Reducer<State, Action, Environment> for F
where
    Action: Send + 'static,
    F: Fn(&mut State, Action, &Environment) -> Vec<Effect<Action>>,
{
    fn reduce(&self, state: &mut State, action: Action, env: &Environment) -> Vec<Effect<Action>> {
        self(state, action, env)
    }
}
