//! Stack of nested game loops
//!
//! Only the top loop is "current"; everything else is suspended underneath
//! it. Pushing and popping never drops a loop: `pop` hands it back so the
//! caller can keep it (a pause menu reused every time the game is paused).

use super::game_loop::{GameLoop, LoopError};
use crate::scene::{Camera, World};

/// LIFO of active loops
#[derive(Default)]
pub struct ExecutionLoopStack {
    loops: Vec<Box<dyn GameLoop>>,
}

impl ExecutionLoopStack {
    /// Create an empty stack
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `game_loop` current, suspending the previous top
    pub fn push(&mut self, game_loop: Box<dyn GameLoop>) {
        log::debug!("Loop stack: push '{}' (depth {})", game_loop.name(), self.loops.len() + 1);
        self.loops.push(game_loop);
    }

    /// Remove and return the current loop
    pub fn pop(&mut self) -> Result<Box<dyn GameLoop>, LoopError> {
        let popped = self.loops.pop().ok_or(LoopError::EmptyStack)?;
        log::debug!("Loop stack: pop '{}' (depth {})", popped.name(), self.loops.len());
        Ok(popped)
    }

    /// The current loop
    pub fn current(&self) -> Result<&dyn GameLoop, LoopError> {
        match self.loops.last() {
            Some(game_loop) => Ok(&**game_loop),
            None => Err(LoopError::EmptyStack),
        }
    }

    /// Mutable access to the current loop
    pub fn current_mut(&mut self) -> Result<&mut dyn GameLoop, LoopError> {
        match self.loops.last_mut() {
            Some(game_loop) => Ok(&mut **game_loop),
            None => Err(LoopError::EmptyStack),
        }
    }

    /// World of the current loop
    pub fn current_world(&self) -> Result<&World, LoopError> {
        Ok(self.current()?.world())
    }

    /// Camera of the current loop's world
    pub fn current_camera(&self) -> Result<&Camera, LoopError> {
        Ok(self.current_world()?.camera())
    }

    /// Number of active loops
    pub fn depth(&self) -> usize {
        self.loops.len()
    }

    /// Whether no loop is active
    pub fn is_empty(&self) -> bool {
        self.loops.is_empty()
    }
}

impl std::fmt::Debug for ExecutionLoopStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.loops.iter().map(|game_loop| game_loop.name()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec2;
    use crate::runtime::{LoopControl, TickContext};

    struct Named {
        name: &'static str,
        world: World,
    }

    impl Named {
        fn boxed(name: &'static str, width: f32) -> Box<dyn GameLoop> {
            Box::new(Self {
                name,
                world: World::new(Vec2::new(width, 10.0)),
            })
        }
    }

    impl GameLoop for Named {
        fn name(&self) -> &str {
            self.name
        }

        fn world(&self) -> &World {
            &self.world
        }

        fn world_mut(&mut self) -> &mut World {
            &mut self.world
        }

        fn tick(&mut self, _ctx: &mut TickContext<'_>) -> Result<LoopControl, LoopError> {
            Ok(LoopControl::Continue)
        }
    }

    #[test]
    fn test_push_and_pop_switch_current() {
        let mut stack = ExecutionLoopStack::new();
        stack.push(Named::boxed("level", 320.0));
        assert_eq!(stack.current().unwrap().name(), "level");

        stack.push(Named::boxed("pause", 100.0));
        assert_eq!(stack.current().unwrap().name(), "pause");
        assert_eq!(stack.depth(), 2);

        let pause = stack.pop().unwrap();
        assert_eq!(pause.name(), "pause");
        assert_eq!(stack.current().unwrap().name(), "level");

        // A popped loop survives and can be pushed again
        stack.push(pause);
        assert_eq!(stack.current().unwrap().name(), "pause");
    }

    #[test]
    fn test_empty_stack_errors() {
        let mut stack = ExecutionLoopStack::new();
        assert!(matches!(stack.pop(), Err(LoopError::EmptyStack)));
        assert!(matches!(stack.current(), Err(LoopError::EmptyStack)));
        assert!(matches!(stack.current_mut(), Err(LoopError::EmptyStack)));
        assert!(matches!(stack.current_world(), Err(LoopError::EmptyStack)));
        assert!(matches!(stack.current_camera(), Err(LoopError::EmptyStack)));
    }

    #[test]
    fn test_helpers_forward_to_current() {
        let mut stack = ExecutionLoopStack::new();
        stack.push(Named::boxed("level", 320.0));
        stack.push(Named::boxed("menu", 64.0));
        assert_eq!(stack.current_camera().unwrap().viewport.x, 64.0);

        stack.current_mut().unwrap().world_mut().camera_mut().pan(Vec2::new(1.0, 0.0));
        assert_eq!(stack.current_camera().unwrap().position.x, 1.0);

        stack.pop().unwrap();
        assert_eq!(stack.current_camera().unwrap().viewport.x, 320.0);
        assert_eq!(stack.current_camera().unwrap().position.x, 0.0);
    }
}
