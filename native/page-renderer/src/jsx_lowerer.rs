//! JSX Lowering for the page renderer

use lazy_static::lazy_static;
use oxc_allocator::{Allocator, Box as oxc_box, CloneIn};
use oxc_ast::ast::*;
use oxc_ast::AstBuilder;
use oxc_ast_visit::walk_mut::walk_expression;
use oxc_ast_visit::VisitMut;
use oxc_span::SPAN;
use regex::{Captures, Regex};

lazy_static! {
    static ref ENTITY: Regex = Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[A-Za-z][A-Za-z0-9]*);").unwrap();
    static ref IDENTIFIER_KEY: Regex = Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").unwrap();
}

// ═══════════════════════════════════════════════════════════════════════════════
// JSX LOWERER
// Transforms JSX elements into React.createElement(type, props, ...children)
// ═══════════════════════════════════════════════════════════════════════════════

pub struct JsxLowerer<'a> {
    pub ast: AstBuilder<'a>,
    /// Number of elements and fragments lowered so far.
    pub lowered: usize,
}

impl<'a> JsxLowerer<'a> {
    pub fn new(allocator: &'a Allocator) -> Self {
        Self {
            ast: AstBuilder::new(allocator),
            lowered: 0,
        }
    }

    fn lower_jsx_element(&mut self, element: &JSXElement<'a>) -> Expression<'a> {
        let element_type = self.element_type(&element.opening_element.name);

        let mut props = self.ast.vec();
        for item in &element.opening_element.attributes {
            match item {
                JSXAttributeItem::Attribute(attr) => {
                    let key = match &attr.name {
                        JSXAttributeName::Identifier(id) => self.property_key(&id.name),
                        JSXAttributeName::NamespacedName(ns) => {
                            let name = format!("{}:{}", ns.namespace.name, ns.name.name);
                            self.property_key(&name)
                        }
                    };

                    let value = match &attr.value {
                        Some(JSXAttributeValue::StringLiteral(s)) => {
                            if s.value.contains('&') {
                                let decoded = decode_entities(&s.value);
                                let atom = self.ast.allocator.alloc_str(&decoded);
                                self.ast.expression_string_literal(SPAN, atom, None)
                            } else {
                                Expression::StringLiteral(self.ast.alloc((**s).clone()))
                            }
                        }
                        Some(JSXAttributeValue::Element(el)) => self.lower_jsx_element(el),
                        Some(JSXAttributeValue::Fragment(frag)) => self.lower_jsx_fragment(frag),
                        Some(JSXAttributeValue::ExpressionContainer(container)) => {
                            match self.lower_jsx_expression(&container.expression) {
                                Some(e) => e,
                                None => self.ast.expression_identifier(SPAN, "undefined"),
                            }
                        }
                        None => self.ast.expression_boolean_literal(SPAN, true),
                    };

                    props.push(self.ast.object_property_kind_object_property(
                        SPAN,
                        PropertyKind::Init,
                        key,
                        value,
                        false,
                        false,
                        false,
                    ));
                }
                JSXAttributeItem::SpreadAttribute(spread) => {
                    let mut argument = spread.argument.clone_in(self.ast.allocator);
                    self.visit_expression(&mut argument);
                    props.push(self.ast.object_property_kind_spread_property(SPAN, argument));
                }
            }
        }

        let props_expr = if props.is_empty() {
            self.ast.expression_null_literal(SPAN)
        } else {
            self.ast.expression_object(SPAN, props)
        };

        self.create_element(element_type, props_expr, &element.children)
    }

    fn lower_jsx_fragment(&mut self, fragment: &JSXFragment<'a>) -> Expression<'a> {
        let fragment_type = Expression::from(self.ast.member_expression_static(
            SPAN,
            self.ast.expression_identifier(SPAN, "React"),
            self.ast.identifier_name(SPAN, "Fragment"),
            false,
        ));
        let props = self.ast.expression_null_literal(SPAN);
        self.create_element(fragment_type, props, &fragment.children)
    }

    fn create_element(
        &mut self,
        element_type: Expression<'a>,
        props: Expression<'a>,
        children: &[JSXChild<'a>],
    ) -> Expression<'a> {
        self.lowered += 1;

        let mut args = self.ast.vec();
        args.push(Argument::from(element_type));
        args.push(Argument::from(props));

        for child in children {
            match child {
                JSXChild::Text(t) => {
                    if let Some(text) = clean_jsx_text(&t.value) {
                        let atom = self.ast.allocator.alloc_str(&text);
                        args.push(Argument::from(
                            self.ast.expression_string_literal(SPAN, atom, None),
                        ));
                    }
                }
                JSXChild::Element(el) => {
                    args.push(Argument::from(self.lower_jsx_element(el)));
                }
                JSXChild::Fragment(frag) => {
                    args.push(Argument::from(self.lower_jsx_fragment(frag)));
                }
                JSXChild::ExpressionContainer(container) => {
                    // `{/* comment */}` lowers to nothing
                    if let Some(e) = self.lower_jsx_expression(&container.expression) {
                        args.push(Argument::from(e));
                    }
                }
                JSXChild::Spread(spread) => {
                    let mut argument = spread.expression.clone_in(self.ast.allocator);
                    self.visit_expression(&mut argument);
                    args.push(self.ast.argument_spread_element(SPAN, argument));
                }
            }
        }

        let callee = Expression::from(self.ast.member_expression_static(
            SPAN,
            self.ast.expression_identifier(SPAN, "React"),
            self.ast.identifier_name(SPAN, "createElement"),
            false,
        ));

        self.ast.expression_call(
            SPAN,
            callee,
            None::<oxc_box<TSTypeParameterInstantiation>>,
            args,
            false,
        )
    }

    /// Intrinsic tags become strings; components and member tags stay references.
    fn element_type(&self, name: &JSXElementName<'a>) -> Expression<'a> {
        match name {
            JSXElementName::Identifier(id) => {
                self.ast.expression_string_literal(SPAN, id.name.clone(), None)
            }
            JSXElementName::IdentifierReference(id) => {
                self.ast.expression_identifier(SPAN, id.name.clone())
            }
            JSXElementName::NamespacedName(ns) => {
                let name = format!("{}:{}", ns.namespace.name, ns.name.name);
                let atom = self.ast.allocator.alloc_str(&name);
                self.ast.expression_string_literal(SPAN, atom, None)
            }
            JSXElementName::MemberExpression(me) => self.member_reference(me),
            JSXElementName::ThisExpression(_) => self.ast.expression_this(SPAN),
        }
    }

    fn member_reference(&self, me: &JSXMemberExpression<'a>) -> Expression<'a> {
        let object = match &me.object {
            JSXMemberExpressionObject::IdentifierReference(id) => {
                self.ast.expression_identifier(SPAN, id.name.clone())
            }
            JSXMemberExpressionObject::MemberExpression(inner) => self.member_reference(inner),
            JSXMemberExpressionObject::ThisExpression(_) => self.ast.expression_this(SPAN),
        };
        Expression::from(self.ast.member_expression_static(
            SPAN,
            object,
            self.ast.identifier_name(SPAN, me.property.name.clone()),
            false,
        ))
    }

    /// `aria-label` and `xlink:href` need quoted keys.
    fn property_key(&self, name: &str) -> PropertyKey<'a> {
        let atom = self.ast.allocator.alloc_str(name);
        if IDENTIFIER_KEY.is_match(name) {
            PropertyKey::StaticIdentifier(self.ast.alloc(self.ast.identifier_name(SPAN, atom)))
        } else {
            PropertyKey::StringLiteral(self.ast.alloc_string_literal(SPAN, atom, None))
        }
    }

    fn lower_jsx_expression(&mut self, jsx_expr: &JSXExpression<'a>) -> Option<Expression<'a>> {
        let mut e = jsx_expr.as_expression()?.clone_in(self.ast.allocator);
        self.visit_expression(&mut e);
        Some(e)
    }
}

impl<'a> VisitMut<'a> for JsxLowerer<'a> {
    fn visit_expression(&mut self, expr: &mut Expression<'a>) {
        match expr {
            Expression::JSXElement(element) => {
                let lowered = self.lower_jsx_element(element);
                *expr = lowered;
            }
            Expression::JSXFragment(fragment) => {
                let lowered = self.lower_jsx_fragment(fragment);
                *expr = lowered;
            }
            _ => {
                walk_expression(self, expr);
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// JSX TEXT
// ═══════════════════════════════════════════════════════════════════════════════

/// Applies JSX whitespace rules to a text child: lines are trimmed where they
/// meet a line break, blank lines vanish and the survivors are joined with a
/// single space. Returns `None` when nothing visible remains.
pub fn clean_jsx_text(raw: &str) -> Option<String> {
    let normalized = raw.replace("\r\n", "\n").replace('\r', "\n");
    let lines: Vec<&str> = normalized.split('\n').collect();
    let last_non_empty = lines
        .iter()
        .rposition(|line| line.chars().any(|c| c != ' ' && c != '\t'));

    let mut out = String::new();
    for (i, line) in lines.iter().enumerate() {
        let mut trimmed = line.replace('\t', " ");
        if i != 0 {
            trimmed = trimmed.trim_start_matches(' ').to_string();
        }
        if i != lines.len() - 1 {
            trimmed = trimmed.trim_end_matches(' ').to_string();
        }
        if trimmed.is_empty() {
            continue;
        }
        if Some(i) != last_non_empty {
            trimmed.push(' ');
        }
        out.push_str(&trimmed);
    }

    if out.is_empty() {
        None
    } else {
        Some(decode_entities(&out))
    }
}

pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    ENTITY
        .replace_all(text, |caps: &Captures| {
            let body = &caps[1];
            let decoded = if let Some(hex) = body.strip_prefix("#x").or_else(|| body.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = body.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                named_entity(body)
            };
            match decoded {
                Some(c) => c.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

fn named_entity(name: &str) -> Option<char> {
    let c = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        "copy" => '©',
        "reg" => '®',
        "trade" => '™',
        "hellip" => '…',
        "mdash" => '—',
        "ndash" => '–',
        "lsquo" => '‘',
        "rsquo" => '’',
        "ldquo" => '“',
        "rdquo" => '”',
        "laquo" => '«',
        "raquo" => '»',
        "bull" => '•',
        "middot" => '·',
        "times" => '×',
        "divide" => '÷',
        "deg" => '°',
        "euro" => '€',
        "pound" => '£',
        "yen" => '¥',
        "cent" => '¢',
        "sect" => '§',
        "para" => '¶',
        "larr" => '←',
        "rarr" => '→',
        "uarr" => '↑',
        "darr" => '↓',
        "hearts" => '♥',
        "check" => '✓',
        _ => return None,
    };
    Some(c)
}
