//! `__typename` injection.
//!
//! Client-side stores normalize responses by entity type, so every object in
//! a response has to say what it is. [`add_typename`] rewrites a document so
//! that every field and inline fragment with sub-selections also selects an
//! unaliased `__typename`.

use crate::ast::{
    Definition, Document, Field, FragmentDefinition, InlineFragment, Mutation,
    OperationDefinition, Query, Selection, SelectionSet, Subscription,
};

/// Name of the discriminator field.
pub const TYPENAME: &str = "__typename";

/// Returns a copy of `document` in which every field and inline fragment
/// that has sub-selections also selects `__typename`.
///
/// Nodes are visited pre-order, depth-first, in document order, including
/// those inside fragment definitions. A selection set that already holds an
/// unaliased `__typename` is kept as is, so running this twice is the same as
/// running it once. Operation and fragment roots are not fields and are left
/// alone; their fields are not.
pub fn add_typename(document: &Document) -> Document {
    Document {
        definitions: document.definitions.iter().map(definition).collect(),
    }
}

/// True when `set` directly selects an unaliased `__typename`.
pub fn has_typename(set: &SelectionSet) -> bool {
    set.items.iter().any(|selection| match selection {
        Selection::Field(field) => field.name == TYPENAME && field.alias.is_none(),
        Selection::FragmentSpread(_) | Selection::InlineFragment(_) => false,
    })
}

/// True when [`add_typename`] would not change `document`.
pub fn is_typename_complete(document: &Document) -> bool {
    document.definitions.iter().all(|definition| {
        let root = match definition {
            Definition::Operation(operation) => root_selection_set(operation),
            Definition::Fragment(fragment) => &fragment.selection_set,
        };
        root.items.iter().all(selection_is_complete)
    })
}

fn root_selection_set(operation: &OperationDefinition) -> &SelectionSet {
    match operation {
        OperationDefinition::SelectionSet(set) => set,
        OperationDefinition::Query(query) => &query.selection_set,
        OperationDefinition::Mutation(mutation) => &mutation.selection_set,
        OperationDefinition::Subscription(subscription) => &subscription.selection_set,
    }
}

fn selection_is_complete(selection: &Selection) -> bool {
    let set = match selection {
        Selection::Field(field) => &field.selection_set,
        Selection::InlineFragment(fragment) => &fragment.selection_set,
        Selection::FragmentSpread(_) => return true,
    };
    (set.items.is_empty() || has_typename(set)) && set.items.iter().all(selection_is_complete)
}

fn definition(definition: &Definition) -> Definition {
    match definition {
        Definition::Operation(operation) => Definition::Operation(operation_definition(operation)),
        Definition::Fragment(fragment) => Definition::Fragment(FragmentDefinition {
            position: fragment.position,
            name: fragment.name.clone(),
            type_condition: fragment.type_condition.clone(),
            directives: fragment.directives.clone(),
            selection_set: selection_set(&fragment.selection_set, false),
        }),
    }
}

fn operation_definition(operation: &OperationDefinition) -> OperationDefinition {
    match operation {
        OperationDefinition::SelectionSet(set) => {
            OperationDefinition::SelectionSet(selection_set(set, false))
        }
        OperationDefinition::Query(query) => OperationDefinition::Query(Query {
            position: query.position,
            name: query.name.clone(),
            variable_definitions: query.variable_definitions.clone(),
            directives: query.directives.clone(),
            selection_set: selection_set(&query.selection_set, false),
        }),
        OperationDefinition::Mutation(mutation) => OperationDefinition::Mutation(Mutation {
            position: mutation.position,
            name: mutation.name.clone(),
            variable_definitions: mutation.variable_definitions.clone(),
            directives: mutation.directives.clone(),
            selection_set: selection_set(&mutation.selection_set, false),
        }),
        OperationDefinition::Subscription(subscription) => {
            OperationDefinition::Subscription(Subscription {
                position: subscription.position,
                name: subscription.name.clone(),
                variable_definitions: subscription.variable_definitions.clone(),
                directives: subscription.directives.clone(),
                selection_set: selection_set(&subscription.selection_set, false),
            })
        }
    }
}

/// Rewrites the children of `set`, appending `__typename` when `inject` is
/// set and the set is non-empty without one.
fn selection_set(set: &SelectionSet, inject: bool) -> SelectionSet {
    let mut items: Vec<Selection> = set.items.iter().map(selection).collect();
    if inject && !set.items.is_empty() && !has_typename(set) {
        items.push(typename_field(set));
    }
    SelectionSet {
        span: set.span,
        items,
    }
}

fn selection(selection: &Selection) -> Selection {
    match selection {
        Selection::Field(field) => Selection::Field(Field {
            position: field.position,
            alias: field.alias.clone(),
            name: field.name.clone(),
            arguments: field.arguments.clone(),
            directives: field.directives.clone(),
            selection_set: selection_set(&field.selection_set, true),
        }),
        Selection::InlineFragment(fragment) => Selection::InlineFragment(InlineFragment {
            position: fragment.position,
            type_condition: fragment.type_condition.clone(),
            directives: fragment.directives.clone(),
            selection_set: selection_set(&fragment.selection_set, true),
        }),
        Selection::FragmentSpread(spread) => Selection::FragmentSpread(spread.clone()),
    }
}

// Placed at the closing brace of the set it is added to.
fn typename_field(parent: &SelectionSet) -> Selection {
    let (_, end) = parent.span;
    Selection::Field(Field {
        position: end,
        alias: None,
        name: TYPENAME.to_string(),
        arguments: Vec::new(),
        directives: Vec::new(),
        selection_set: SelectionSet {
            span: (end, end),
            items: Vec::new(),
        },
    })
}
