//! Per-program uniform location cache.

use std::collections::HashMap;

use crate::context::{Context, Program, UniformLocation};

/// Caches `glGetUniformLocation` results keyed by `(program, name)`.
///
/// Misses are cached too: a name resolving to
/// [`UniformLocation::INVALID`] is not looked up again until the program is
/// deleted.
#[derive(Debug, Default)]
pub(crate) struct LocationCache {
    programs: HashMap<Program, HashMap<String, UniformLocation>>,
}

impl LocationCache {
    pub(crate) fn get(
        &mut self,
        ctx: &mut dyn Context,
        program: Program,
        name: &str,
    ) -> UniformLocation {
        let names = self.programs.entry(program).or_default();
        if let Some(location) = names.get(name) {
            return *location;
        }
        let location = ctx.get_uniform_location(program, name);
        names.insert(name.to_owned(), location);
        location
    }

    /// Evicts every entry of `program`.
    pub(crate) fn delete_program(&mut self, program: Program) {
        self.programs.remove(&program);
    }

    pub(crate) fn clear(&mut self) {
        self.programs.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingContext;

    #[test]
    fn lookups_are_cached_per_program() {
        let mut ctx = RecordingContext::new();
        let log = ctx.log();
        let mut cache = LocationCache::default();

        let a = cache.get(&mut ctx, Program(1), "viewport_size");
        let b = cache.get(&mut ctx, Program(1), "viewport_size");
        assert_eq!(a, b);
        assert_eq!(log.count("get_uniform_location"), 1);

        cache.get(&mut ctx, Program(2), "viewport_size");
        assert_eq!(log.count("get_uniform_location"), 2);
    }

    #[test]
    fn misses_are_cached() {
        let mut ctx = RecordingContext::new();
        ctx.set_missing_uniform("unused");
        let log = ctx.log();
        let mut cache = LocationCache::default();

        assert_eq!(cache.get(&mut ctx, Program(1), "unused"), UniformLocation::INVALID);
        assert_eq!(cache.get(&mut ctx, Program(1), "unused"), UniformLocation::INVALID);
        assert_eq!(log.count("get_uniform_location"), 1);
    }

    #[test]
    fn delete_program_evicts() {
        let mut ctx = RecordingContext::new();
        let log = ctx.log();
        let mut cache = LocationCache::default();

        cache.get(&mut ctx, Program(1), "scale");
        cache.delete_program(Program(1));
        cache.get(&mut ctx, Program(1), "scale");
        assert_eq!(log.count("get_uniform_location"), 2);
    }
}
