//! Radix tree insertion and lookup
//!
//! This module implements the routing engine proper: adding a route to a
//! [`Node`] tree (splitting nodes on partial prefix matches, building the
//! `Param` / `Wildcard` chains for variable segments, keeping sibling
//! priorities sorted) and walking the tree for a request path.
//!
//! ## Key Properties
//!
//! - **O(k) Lookup**: matching time is proportional to the path length, not to
//!   the number of registered routes
//! - **Only explicit matches**: a static and a variable segment never compete
//!   for the same slot, so a request matches at most one route
//! - **Atomic registration**: an insertion is checked against the tree before
//!   anything is mutated, a rejected route leaves no trace
//! - **No tears from trailing slashes**: a request that differs from a route
//!   only by a trailing `/` resolves to that route
//!
//! ## Tree Shape
//!
//! ```text
//! /users/:id, /users/:id/posts, /search, /assets/*filepath
//!
//! "/"                     root
//! ├── "users/"
//! │   └── ":id"           param      (variable child)
//! │       └── "/posts"
//! ├── "search"
//! └── "assets"
//!     └── ""              wildcard marker (variable child)
//!         └── "/*filepath"
//! ```
//!
//! The catch-all owns the `/` in front of `*`, so `/assets/css/site.css`
//! captures `filepath = "/css/site.css"`.

use std::mem;
use std::sync::Arc;

use super::core::ParamVec;
use super::error::RouteError;
use super::node::{Node, NodeKind, Payload};
use super::path::{common_prefix, find_variable, parse_route, variable_count, Marker};

/// Result of walking a tree for one request path
pub(crate) struct Lookup<'a, T> {
    /// Extracted variables in path order
    pub params: ParamVec,
    /// The matched route's handler, `None` on a miss
    pub handler: Option<&'a T>,
    /// Middleware collected on the way down, followed by the handler when found
    pub stack: Vec<&'a T>,
}

/// State threaded through nested (group) lookups
struct Captures<'a, T> {
    params: ParamVec,
    stack: Vec<&'a T>,
}

/// A handler reachable by dropping a trailing slash, recorded while descending
struct Fallback<'a, T> {
    handler: &'a T,
    params: usize,
    stack: usize,
}

impl<T> Node<T> {
    /// Register `payload` for `route`.
    ///
    /// # Errors
    ///
    /// Any [`RouteError`]; on error the tree is left untouched.
    pub(crate) fn insert(&mut self, route: &str, payload: Payload<T>) -> Result<(), RouteError> {
        let folded = parse_route(route)?;
        if payload.is_group() && find_variable(&folded).is_some() {
            return Err(RouteError::InvalidGroupPrefix {
                path: route.to_string(),
            });
        }
        self.check_insert(&folded, payload.is_group(), route)?;

        self.priority += 1;
        self.max_variable_depth = self.max_variable_depth.max(variable_count(&folded));

        if self.is_empty_tree() {
            // The root keeps its Root kind, so a group cannot live on it directly.
            return if payload.is_group() {
                self.insert_branch(&folded, payload, route)
            } else {
                self.insert_child(&folded, payload, route)
            };
        }

        let mut node = self;
        let mut rest: &str = &folded;
        loop {
            let i = common_prefix(rest, &node.segment);
            if i < node.segment.len() {
                node.split_at(i);
            }
            rest = &rest[i..];

            if rest.is_empty() {
                return node.attach(payload, route);
            }
            if node.is_group() {
                return Err(RouteError::ExtendsGroup {
                    path: route.to_string(),
                });
            }

            if node.has_variable_child {
                variable_agrees(&node.children[0], rest, route)?;
                node = &mut node.children[0];
                node.priority += 1;
                node.max_variable_depth = node.max_variable_depth.max(variable_count(rest));
                continue;
            }

            if let Some(idx) = rest.chars().next().and_then(|c| node.static_child(c)) {
                let idx = node.bump(idx);
                node = &mut node.children[idx];
                node.max_variable_depth = node.max_variable_depth.max(variable_count(rest));
                continue;
            }

            return node.insert_branch(rest, payload, route);
        }
    }

    /// Report whether a sub-router could be mounted at `prefix`.
    pub(crate) fn check_group(&self, prefix: &str) -> Result<(), RouteError> {
        let folded = parse_route(prefix)?;
        self.check_insert(&folded, true, prefix)
    }

    /// Walk the tree the way [`Node::insert`] would, without mutating it, and
    /// report the error the insertion would hit.
    fn check_insert(&self, folded: &str, group: bool, route: &str) -> Result<(), RouteError> {
        if self.is_empty_tree() {
            return Ok(());
        }

        let mut node = self;
        let mut rest = folded;
        loop {
            let i = common_prefix(rest, &node.segment);
            rest = &rest[i..];

            if i < node.segment.len() {
                // After the split `node` keeps the prefix and exactly one child.
                if rest.is_empty() {
                    return if group {
                        Err(RouteError::GroupConflict {
                            path: route.to_string(),
                        })
                    } else {
                        Ok(())
                    };
                }
                return check_branch(true, rest, route);
            }

            if rest.is_empty() {
                return node.check_attach(group, route);
            }
            if node.is_group() {
                return Err(RouteError::ExtendsGroup {
                    path: route.to_string(),
                });
            }

            if node.has_variable_child {
                let child = &node.children[0];
                variable_agrees(child, rest, route)?;
                node = child;
                continue;
            }

            if let Some(idx) = rest.chars().next().and_then(|c| node.static_child(c)) {
                node = &node.children[idx];
                continue;
            }

            return check_branch(!node.children.is_empty(), rest, route);
        }
    }

    fn check_attach(&self, group: bool, route: &str) -> Result<(), RouteError> {
        if self.handler.is_some() || self.is_group() {
            return Err(RouteError::Duplicate {
                path: route.to_string(),
            });
        }
        if group
            && (!self.children.is_empty()
                || matches!(self.kind, NodeKind::Root)
                || self.kind.is_variable())
        {
            return Err(RouteError::GroupConflict {
                path: route.to_string(),
            });
        }
        Ok(())
    }

    fn attach(&mut self, payload: Payload<T>, route: &str) -> Result<(), RouteError> {
        self.check_attach(payload.is_group(), route)?;
        match payload {
            Payload::Handler(handler) => self.handler = Some(handler),
            Payload::Group(sub) => self.kind = NodeKind::Group(sub),
        }
        Ok(())
    }

    /// Split this node so that it keeps `segment[..i]` and a new child takes
    /// over the suffix together with everything hanging off this node.
    fn split_at(&mut self, i: usize) {
        let suffix = self.segment.split_off(i);

        // The root stays the root and keeps its middleware.
        let kind = if matches!(self.kind, NodeKind::Root) {
            NodeKind::Static
        } else {
            mem::replace(&mut self.kind, NodeKind::Static)
        };

        let child = Node {
            segment: suffix,
            kind,
            has_variable_child: self.has_variable_child,
            max_variable_depth: self.max_variable_depth,
            child_order: mem::take(&mut self.child_order),
            children: mem::take(&mut self.children),
            handler: self.handler.take(),
            priority: self.priority.saturating_sub(1),
            middleware: Vec::new(),
        };
        debug_assert!(child
            .children
            .iter()
            .all(|c| c.max_variable_depth <= child.max_variable_depth));

        self.has_variable_child = false;
        if let Some(first) = child.segment.chars().next() {
            self.push_static_child(first, child);
        }
    }

    /// Start a new branch below this node for `rest`, which shares no first
    /// character with any existing static child.
    fn insert_branch(&mut self, rest: &str, payload: Payload<T>, route: &str) -> Result<(), RouteError> {
        if rest.starts_with(':') || rest.starts_with("/*") {
            return self.insert_child(rest, payload, route);
        }
        if rest.starts_with('*') {
            return Err(RouteError::CatchAllConflict {
                path: route.to_string(),
            });
        }
        let Some(first) = rest.chars().next() else {
            return self.attach(payload, route);
        };
        let idx = self.push_static_child(first, Node::new_static());
        let idx = self.bump(idx);
        self.children[idx].insert_child(rest, payload, route)
    }

    /// Attach `fragment` below (and into) this node, building `Param` and
    /// `Wildcard` nodes for its variables.
    ///
    /// The literal before the first marker becomes this node's segment, so
    /// this is only called on fresh nodes, an empty root, or with a fragment
    /// that starts with a marker.
    fn insert_child(&mut self, fragment: &str, payload: Payload<T>, route: &str) -> Result<(), RouteError> {
        let mut node = self;
        let mut fragment = fragment;
        loop {
            node.max_variable_depth = node.max_variable_depth.max(variable_count(fragment));
            let Some(var) = find_variable(fragment) else {
                if !fragment.is_empty() {
                    node.segment = fragment.to_string();
                }
                return node.attach(payload, route);
            };

            if !node.children.is_empty() {
                return Err(RouteError::VariableConflict {
                    path: route.to_string(),
                });
            }

            let name = var.name(fragment);
            match var.marker {
                Marker::Param => {
                    if var.start > 0 {
                        node.segment = fragment[..var.start].to_string();
                    }
                    let mut child = Node::new_param(&fragment[var.start..var.end], name);
                    child.priority = 1;
                    child.max_variable_depth = variable_count(&fragment[var.start..]);
                    node.set_variable_child(child);
                    node = &mut node.children[0];

                    fragment = &fragment[var.end..];
                    if fragment.is_empty() {
                        return node.attach(payload, route);
                    }
                    if fragment.starts_with("/*") {
                        // the catch-all marker hangs directly off the param
                        continue;
                    }

                    let mut next = Node::new_static();
                    next.priority = 1;
                    let idx = node.push_static_child('/', next);
                    node = &mut node.children[idx];
                }
                Marker::CatchAll => {
                    if var.start == 0 {
                        // the `/` in front of `*` already belongs to an existing node
                        return Err(RouteError::CatchAllConflict {
                            path: route.to_string(),
                        });
                    }
                    let Payload::Handler(handler) = payload else {
                        return Err(RouteError::InvalidGroupPrefix {
                            path: route.to_string(),
                        });
                    };

                    let slash = var.start - 1;
                    if slash > 0 {
                        node.segment = fragment[..slash].to_string();
                    }

                    let mut catch_all = Node::new_catch_all(&fragment[slash..], name);
                    catch_all.priority = 1;
                    catch_all.max_variable_depth = 1;
                    catch_all.handler = Some(handler);

                    let mut marker = Node::new_wildcard_marker();
                    marker.priority = 1;
                    marker.max_variable_depth = 1;
                    marker.set_variable_child(catch_all);

                    node.set_variable_child(marker);
                    return Ok(());
                }
            }
        }
    }

    /// Find the handler for `path`, collecting middleware and parameters.
    pub(crate) fn lookup(&self, path: &str) -> Lookup<'_, T> {
        let folded = path.to_lowercase();
        let mut captures = Captures {
            params: ParamVec::with_capacity(self.max_variable_depth),
            stack: Vec::new(),
        };
        let handler = self.resolve(&folded, &mut captures);
        if let Some(handler) = handler {
            captures.stack.push(handler);
        }
        Lookup {
            params: captures.params,
            handler,
            stack: captures.stack,
        }
    }

    /// Walk from this node over an already lower-cased path; captured values
    /// are cut from that same path.
    fn resolve<'a>(&'a self, folded: &str, cap: &mut Captures<'a, T>) -> Option<&'a T> {
        // Every walk starts at a root, the outer tree's or a mounted sub-router's.
        cap.stack.extend(self.middleware.iter());

        let mut node = self;
        let mut pos = 0;
        let mut fallback: Option<Fallback<'a, T>> = None;

        let found = loop {
            let path = &folded[pos..];
            match &node.kind {
                NodeKind::Param { name } => {
                    let end = path.find('/').unwrap_or(path.len());
                    if end == 0 {
                        break None;
                    }
                    cap.params
                        .push((Arc::clone(name), path[..end].to_string()));

                    let rest = &path[end..];
                    if rest.is_empty() {
                        break node
                            .handler
                            .as_ref()
                            .or_else(|| node.trailing_slash_handler(cap));
                    }
                    match node.children.first() {
                        Some(child) => {
                            node.remember(rest, &mut fallback, cap);
                            pos += end;
                            node = child;
                        }
                        None if rest == "/" => break node.handler.as_ref(),
                        None => break None,
                    }
                }
                NodeKind::Wildcard { name: Some(name) } => {
                    if !path.starts_with('/') {
                        break None;
                    }
                    cap.params.push((Arc::clone(name), path.to_string()));
                    break node.handler.as_ref();
                }
                NodeKind::Group(sub) => {
                    let seg = node.segment.as_str();
                    if path.len() > seg.len() && path.starts_with(seg) {
                        let at = pos + seg.len();
                        break sub.resolve(&folded[at..], cap);
                    }
                    if path == seg {
                        // an empty remainder must not starve the sub-router
                        break sub.resolve("/", cap);
                    }
                    break None;
                }
                NodeKind::Root | NodeKind::Static | NodeKind::Wildcard { name: None } => {
                    let seg = node.segment.as_str();
                    if path.len() > seg.len() && path.starts_with(seg) {
                        let rest = &path[seg.len()..];
                        let next = if node.has_variable_child {
                            node.children.first()
                        } else {
                            rest.chars()
                                .next()
                                .and_then(|c| node.static_child(c))
                                .map(|idx| &node.children[idx])
                        };
                        match next {
                            Some(child) => {
                                node.remember(rest, &mut fallback, cap);
                                pos += seg.len();
                                node = child;
                            }
                            None if rest == "/" => break node.handler.as_ref(),
                            None => break None,
                        }
                    } else if path == seg {
                        break node
                            .handler
                            .as_ref()
                            .or_else(|| node.trailing_slash_handler(cap));
                    } else if seg.len() == path.len() + 1
                        && seg.ends_with('/')
                        && seg.starts_with(path)
                    {
                        break node.handler.as_ref();
                    } else {
                        break None;
                    }
                }
            }
        };

        found.or_else(|| {
            fallback.map(|fb| {
                cap.params.truncate(fb.params);
                cap.stack.truncate(fb.stack);
                fb.handler
            })
        })
    }

    /// Handler for the path that ends exactly at this node plus a `/`.
    fn trailing_slash_handler<'a>(&'a self, cap: &mut Captures<'a, T>) -> Option<&'a T> {
        if self.has_variable_child {
            let marker = self.children.first()?;
            let catch_all = marker.children.first()?;
            return match (&marker.kind, &catch_all.kind, catch_all.handler.as_ref()) {
                (
                    NodeKind::Wildcard { name: None },
                    NodeKind::Wildcard { name: Some(name) },
                    Some(handler),
                ) => {
                    cap.params.push((Arc::clone(name), "/".to_string()));
                    Some(handler)
                }
                _ => None,
            };
        }
        let child = &self.children[self.static_child('/')?];
        if child.segment == "/" {
            child.handler.as_ref()
        } else {
            None
        }
    }

    /// Keep this node's handler as the answer for a request that only adds a
    /// trailing slash, in case the descent below fails.
    fn remember<'a>(&'a self, rest: &str, fallback: &mut Option<Fallback<'a, T>>, cap: &Captures<'a, T>) {
        if rest != "/" {
            return;
        }
        if let Some(handler) = self.handler.as_ref() {
            *fallback = Some(Fallback {
                handler,
                params: cap.params.len(),
                stack: cap.stack.len(),
            });
        }
    }
}

/// A route continuing below a node with a variable child must name the same
/// variable, ending at the same boundary.
fn variable_agrees<T>(child: &Node<T>, rest: &str, route: &str) -> Result<(), RouteError> {
    match &child.kind {
        NodeKind::Param { .. } => {
            let seg = child.segment.as_str();
            let agrees = rest.starts_with(seg)
                && rest[seg.len()..].chars().next().map_or(true, |c| c == '/');
            if agrees {
                Ok(())
            } else {
                Err(RouteError::VariableConflict {
                    path: route.to_string(),
                })
            }
        }
        NodeKind::Wildcard { .. } => {
            let existing = child.children.first().map(|c| c.segment.as_str());
            if existing == Some(rest) {
                Err(RouteError::Duplicate {
                    path: route.to_string(),
                })
            } else {
                Err(RouteError::VariableConflict {
                    path: route.to_string(),
                })
            }
        }
        NodeKind::Root | NodeKind::Static | NodeKind::Group(_) => Err(RouteError::VariableConflict {
            path: route.to_string(),
        }),
    }
}

/// Read-only mirror of [`Node::insert_branch`].
fn check_branch(has_children: bool, rest: &str, route: &str) -> Result<(), RouteError> {
    if rest.starts_with(':') || rest.starts_with("/*") {
        if has_children {
            return Err(RouteError::VariableConflict {
                path: route.to_string(),
            });
        }
        return Ok(());
    }
    if rest.starts_with('*') {
        return Err(RouteError::CatchAllConflict {
            path: route.to_string(),
        });
    }
    Ok(())
}
