//! Handler registry and route resolution.
//!
//! # Responsibilities
//! - Own every configured handler
//! - Keep prefix bindings in declaration order
//! - Resolve a request path to exactly one handler
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Bindings refer to handlers by index, so one handler may serve many prefixes
//! - O(n) scan over bindings (acceptable for typical route counts)
//! - A catch-all binding is required, so there is no NoMatch outcome

use thiserror::Error;

use crate::config::RouteConfig;
use crate::handlers::Handler;
use crate::http::request::normalize_path;
use crate::routing::matcher::{PathPattern, PatternError};

/// Errors raised while assembling a registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error(transparent)]
    InvalidPattern(#[from] PatternError),
    #[error("prefix {0} is bound more than once")]
    DuplicatePrefix(String),
    #[error("no catch-all binding for '/'")]
    MissingCatchAll,
    #[error("binding refers to unknown handler #{0}")]
    UnknownHandler(usize),
}

/// Index of a handler owned by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(usize);

/// A pattern bound to a registered handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathBinding {
    pattern: PathPattern,
    handler: HandlerId,
}

impl PathBinding {
    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    pub fn handler_id(&self) -> HandlerId {
        self.handler
    }
}

/// Collects handlers and bindings before freezing them into a registry.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    handlers: Vec<Handler>,
    bindings: Vec<PathBinding>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a handler without binding it yet.
    pub fn register(&mut self, handler: impl Into<Handler>) -> HandlerId {
        self.handlers.push(handler.into());
        HandlerId(self.handlers.len() - 1)
    }

    /// Bind `pattern` to an already registered handler.
    pub fn bind(&mut self, pattern: &str, handler: HandlerId) -> Result<&mut Self, RegistryError> {
        if handler.0 >= self.handlers.len() {
            return Err(RegistryError::UnknownHandler(handler.0));
        }

        let pattern = PathPattern::parse(pattern)?;
        if self.bindings.iter().any(|b| b.pattern == pattern) {
            return Err(RegistryError::DuplicatePrefix(pattern.to_string()));
        }

        self.bindings.push(PathBinding { pattern, handler });
        Ok(self)
    }

    /// Register `handler` and bind it to `pattern` in one step.
    pub fn mount(
        &mut self,
        pattern: &str,
        handler: impl Into<Handler>,
    ) -> Result<HandlerId, RegistryError> {
        // a failed mount must not register the handler
        let parsed = PathPattern::parse(pattern)?;
        if self.bindings.iter().any(|b| b.pattern == parsed) {
            return Err(RegistryError::DuplicatePrefix(parsed.to_string()));
        }
        let id = self.register(handler);
        self.bindings.push(PathBinding {
            pattern: parsed,
            handler: id,
        });
        Ok(id)
    }

    pub fn build(self) -> Result<HandlerRegistry, RegistryError> {
        let catch_all = self
            .bindings
            .iter()
            .position(|b| b.pattern.is_catch_all())
            .ok_or(RegistryError::MissingCatchAll)?;

        Ok(HandlerRegistry {
            handlers: self.handlers,
            bindings: self.bindings,
            catch_all,
        })
    }
}

/// Frozen set of handlers and their prefix bindings.
#[derive(Debug, Clone)]
pub struct HandlerRegistry {
    handlers: Vec<Handler>,
    bindings: Vec<PathBinding>,
    catch_all: usize,
}

impl HandlerRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Build a registry from configured routes, keeping their order.
    pub fn from_routes(routes: &[RouteConfig]) -> Result<Self, RegistryError> {
        let mut builder = RegistryBuilder::new();
        for route in routes {
            builder.mount(&route.prefix, Handler::from(&route.handler))?;
        }
        builder.build()
    }

    /// Select the binding for `path`.
    ///
    /// The longest match wins; on equal length the earlier binding is kept.
    pub fn resolve_binding(&self, path: &str) -> &PathBinding {
        let path = normalize_path(path);

        let mut best: Option<(usize, &PathBinding)> = None;
        for binding in &self.bindings {
            if binding.pattern.is_catch_all() {
                continue;
            }
            if let Some(len) = binding.pattern.match_len(&path) {
                if best.map_or(true, |(best_len, _)| len > best_len) {
                    best = Some((len, binding));
                }
            }
        }

        match best {
            Some((_, binding)) => binding,
            None => &self.bindings[self.catch_all],
        }
    }

    /// Select the binding for `path` together with the handler it names.
    pub fn resolve_route(&self, path: &str) -> (&PathBinding, &Handler) {
        let binding = self.resolve_binding(path);
        // ids inside bindings were checked against `handlers` by the builder
        (binding, &self.handlers[binding.handler.0])
    }

    /// Select the handler for `path`. Never fails.
    pub fn resolve(&self, path: &str) -> &Handler {
        self.resolve_route(path).1
    }

    /// Look up a handler by id; `None` for ids minted by another registry.
    pub fn handler(&self, id: HandlerId) -> Option<&Handler> {
        self.handlers.get(id.0)
    }

    pub fn bindings(&self) -> &[PathBinding] {
        &self.bindings
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use crate::handlers::{GreetingHandler, RedirectHandler};

    fn reference() -> HandlerRegistry {
        HandlerRegistry::from_routes(&ServerConfig::default().routes).unwrap()
    }

    fn greeting_text(handler: &Handler) -> Option<&str> {
        match handler {
            Handler::Greeting(g) => Some(g.text()),
            Handler::Redirect(_) => None,
        }
    }

    #[test]
    fn reference_routes() {
        let registry = reference();
        assert_eq!(greeting_text(registry.resolve("/hello")), Some("Hello"));
        assert_eq!(greeting_text(registry.resolve("/hello/")), Some("Hello"));
        assert_eq!(greeting_text(registry.resolve("/hello/x")), Some("Hello"));
        assert_eq!(greeting_text(registry.resolve("/it/ciao")), Some("Buongiorno Mondo"));
        assert_eq!(greeting_text(registry.resolve("/fr/anything")), Some("Bonjour le Monde"));
        assert_eq!(
            registry.resolve("/"),
            &Handler::Redirect(RedirectHandler::new("/hello/"))
        );
    }

    #[test]
    fn segment_boundary_falls_back_to_catch_all() {
        let registry = reference();
        assert!(registry.resolve_binding("/helloX").pattern().is_catch_all());
        assert!(registry.resolve_binding("/helloworld").pattern().is_catch_all());
        assert!(registry.resolve_binding("/french").pattern().is_catch_all());
    }

    #[test]
    fn path_is_normalized_before_matching() {
        let registry = reference();
        assert_eq!(greeting_text(registry.resolve("//it/x")), Some("Buongiorno Mondo"));
        assert!(registry.resolve_binding("").pattern().is_catch_all());
    }

    #[test]
    fn longest_prefix_wins_regardless_of_order() {
        let mut builder = HandlerRegistry::builder();
        builder.mount("/api/v1/*", GreetingHandler::new("deep")).unwrap();
        builder.mount("/api/*", GreetingHandler::new("shallow")).unwrap();
        builder.mount("/", RedirectHandler::new("/api/")).unwrap();
        let registry = builder.build().unwrap();

        assert_eq!(greeting_text(registry.resolve("/api/v1/users")), Some("deep"));
        assert_eq!(greeting_text(registry.resolve("/api/v2")), Some("shallow"));
        assert_eq!(greeting_text(registry.resolve("/api")), Some("shallow"));
    }

    #[test]
    fn catch_all_has_lowest_priority_even_when_declared_last() {
        let mut builder = HandlerRegistry::builder();
        builder.mount("/a/*", GreetingHandler::new("a")).unwrap();
        builder.mount("/", RedirectHandler::new("/a/")).unwrap();
        let registry = builder.build().unwrap();
        assert_eq!(greeting_text(registry.resolve("/a/b")), Some("a"));
        assert!(greeting_text(registry.resolve("/b")).is_none());
    }

    #[test]
    fn shared_handler_across_prefixes() {
        let mut builder = HandlerRegistry::builder();
        let hello = builder.register(GreetingHandler::default());
        builder.bind("/hello/*", hello).unwrap();
        builder.bind("/hi/*", hello).unwrap();
        let redirect = builder.register(RedirectHandler::new("/hello/"));
        builder.bind("/", redirect).unwrap();
        let registry = builder.build().unwrap();

        assert_eq!(registry.handler_count(), 2);
        assert_eq!(registry.resolve_binding("/hi/x").handler_id(), hello);
        assert_eq!(registry.resolve_binding("/hello").handler_id(), hello);
        assert_eq!(greeting_text(registry.handler(hello).unwrap()), Some("Hello"));
    }

    #[test]
    fn resolution_is_deterministic() {
        let registry = reference();
        for path in ["/", "/hello/x", "/it", "/nope"] {
            assert!(std::ptr::eq(registry.resolve(path), registry.resolve(path)));
        }
    }

    #[test]
    fn duplicate_prefixes_are_rejected() {
        let mut builder = HandlerRegistry::builder();
        builder.mount("/hello/*", GreetingHandler::default()).unwrap();
        assert_eq!(
            builder.mount("/hello", GreetingHandler::new("again")),
            Err(RegistryError::DuplicatePrefix("/hello/*".into()))
        );
        builder.mount("/", RedirectHandler::new("/hello/")).unwrap();
        assert_eq!(
            builder.mount("/*", RedirectHandler::new("/x")),
            Err(RegistryError::DuplicatePrefix("/".into()))
        );
        // failed mounts do not leak handlers
        assert_eq!(builder.build().unwrap().handler_count(), 2);
    }

    #[test]
    fn catch_all_is_required() {
        let mut builder = HandlerRegistry::builder();
        builder.mount("/hello/*", GreetingHandler::default()).unwrap();
        assert_eq!(builder.build().unwrap_err(), RegistryError::MissingCatchAll);
    }

    #[test]
    fn unknown_handler_id() {
        let mut other = HandlerRegistry::builder();
        other.register(GreetingHandler::default());
        let foreign = other.register(GreetingHandler::default());

        let mut builder = HandlerRegistry::builder();
        assert_eq!(
            builder.bind("/", foreign).err(),
            Some(RegistryError::UnknownHandler(1))
        );
    }

    #[test]
    fn foreign_handler_id_lookup_is_none() {
        let mut other = HandlerRegistry::builder();
        let ids: Vec<_> = (0..5)
            .map(|_| other.register(GreetingHandler::default()))
            .collect();

        let registry = reference();
        assert_eq!(registry.handler_count(), 4);
        assert!(registry.handler(ids[0]).is_some());
        assert!(registry.handler(ids[4]).is_none());
    }

    #[test]
    fn resolve_route_pairs_binding_with_its_handler() {
        let registry = reference();
        let (binding, handler) = registry.resolve_route("/fr/x");
        assert_eq!(binding.pattern().to_string(), "/fr/*");
        assert_eq!(registry.handler(binding.handler_id()), Some(handler));
    }
}
