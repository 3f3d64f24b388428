//! Lossless markup tree for the in-memory document.
//!
//! The parser never fails. Every node keeps the exact source text of its
//! tags, so serializing a freshly parsed fragment yields the input byte for
//! byte, including malformed markup. Only tag names and attributes are
//! interpreted; ids and classes drive element lookup.

use std::borrow::Cow;
use std::sync::atomic::{AtomicU64, Ordering};

/// Elements that never have children or a closing tag.
const VOID_ELEMENTS: &[&str] = &[
	"area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
	"wbr",
];

/// Elements whose content is text up to the matching closing tag.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

const ENTITIES: &[(&str, char)] = &[
	("&amp;", '&'),
	("&lt;", '<'),
	("&gt;", '>'),
	("&quot;", '"'),
	("&#x27;", '\''),
	("&#39;", '\''),
	("&nbsp;", '\u{a0}'),
];

/// Identity of a node within the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u64);

impl NodeId {
	pub(crate) fn new() -> Self {
		static COUNTER: AtomicU64 = AtomicU64::new(0);
		Self(COUNTER.fetch_add(1, Ordering::Relaxed))
	}
}

#[derive(Debug)]
pub(crate) enum Node {
	Element(ElementNode),
	Text(String),
	/// Comments, doctypes and stray closing tags, kept verbatim.
	Raw(String),
}

#[derive(Debug)]
pub(crate) struct ElementNode {
	pub(crate) node_id: NodeId,
	pub(crate) tag: String,
	pub(crate) attributes: Vec<(String, String)>,
	pub(crate) open_tag: String,
	pub(crate) children: Vec<Node>,
	/// `None` for void, self-closing and unclosed elements.
	pub(crate) close_tag: Option<String>,
}

impl ElementNode {
	/// Creates an attribute-less element with synthesized tags.
	pub(crate) fn synthetic(tag: &str) -> Self {
		Self {
			node_id: NodeId::new(),
			tag: tag.to_string(),
			attributes: Vec::new(),
			open_tag: format!("<{tag}>"),
			children: Vec::new(),
			close_tag: Some(format!("</{tag}>")),
		}
	}

	pub(crate) fn attribute(&self, name: &str) -> Option<&str> {
		self.attributes
			.iter()
			.find(|(key, _)| key == name)
			.map(|(_, value)| value.as_str())
	}

	pub(crate) fn has_class(&self, class: &str) -> bool {
		self.attribute("class")
			.is_some_and(|classes| classes.split_ascii_whitespace().any(|c| c == class))
	}

	fn is_void(&self) -> bool {
		VOID_ELEMENTS.contains(&self.tag.as_str())
	}

	pub(crate) fn inner_html(&self) -> String {
		let mut out = String::new();
		serialize_into(&self.children, &mut out);
		out
	}

	pub(crate) fn outer_html(&self) -> String {
		let mut out = self.open_tag.clone();
		serialize_into(&self.children, &mut out);
		if let Some(close) = &self.close_tag {
			out.push_str(close);
		}
		out
	}

	pub(crate) fn text_content(&self) -> String {
		let mut out = String::new();
		collect_text(&self.children, &mut out);
		decode_entities(&out).into_owned()
	}

	/// Replaces the children with a single escaped text node.
	///
	/// Returns the ids of the element descendants that were removed.
	pub(crate) fn set_text_content(&mut self, text: &str) -> Vec<NodeId> {
		if self.is_void() {
			return Vec::new();
		}
		let removed = self.descendant_ids();
		self.children = if text.is_empty() {
			Vec::new()
		} else {
			vec![Node::Text(html_escape(text).into_owned())]
		};
		removed
	}

	/// Replaces the children with a parsed fragment.
	///
	/// Returns the ids of the element descendants that were removed.
	pub(crate) fn set_inner_html(&mut self, html: &str) -> Vec<NodeId> {
		let removed = self.descendant_ids();
		self.children = parse_fragment(html);
		removed
	}

	pub(crate) fn find(&self, node_id: NodeId) -> Option<&ElementNode> {
		if self.node_id == node_id {
			return Some(self);
		}
		self.child_elements().find_map(|child| child.find(node_id))
	}

	pub(crate) fn find_mut(&mut self, node_id: NodeId) -> Option<&mut ElementNode> {
		if self.node_id == node_id {
			return Some(self);
		}
		for child in &mut self.children {
			if let Node::Element(element) = child
				&& let Some(found) = element.find_mut(node_id)
			{
				return Some(found);
			}
		}
		None
	}

	/// First element in document order whose `id` attribute equals `id`.
	pub(crate) fn find_by_id(&self, id: &str) -> Option<&ElementNode> {
		if self.attribute("id") == Some(id) {
			return Some(self);
		}
		self.child_elements().find_map(|child| child.find_by_id(id))
	}

	pub(crate) fn collect_by_class(&self, class: &str, out: &mut Vec<NodeId>) {
		for child in self.child_elements() {
			if child.has_class(class) {
				out.push(child.node_id);
			}
			child.collect_by_class(class, out);
		}
	}

	pub(crate) fn descendant_ids(&self) -> Vec<NodeId> {
		let mut out = Vec::new();
		self.collect_descendant_ids(&mut out);
		out
	}

	fn collect_descendant_ids(&self, out: &mut Vec<NodeId>) {
		for child in self.child_elements() {
			out.push(child.node_id);
			child.collect_descendant_ids(out);
		}
	}

	fn child_elements(&self) -> impl Iterator<Item = &ElementNode> {
		self.children.iter().filter_map(|node| match node {
			Node::Element(element) => Some(element),
			_ => None,
		})
	}
}

/// Escapes HTML special characters in a string.
///
/// Returns a borrowed reference if no escaping is needed.
pub(crate) fn html_escape(s: &str) -> Cow<'_, str> {
	if s.contains(['&', '<', '>', '"', '\'']) {
		let mut escaped = String::with_capacity(s.len() + 8);
		for c in s.chars() {
			match c {
				'&' => escaped.push_str("&amp;"),
				'<' => escaped.push_str("&lt;"),
				'>' => escaped.push_str("&gt;"),
				'"' => escaped.push_str("&quot;"),
				'\'' => escaped.push_str("&#x27;"),
				_ => escaped.push(c),
			}
		}
		Cow::Owned(escaped)
	} else {
		Cow::Borrowed(s)
	}
}

/// Decodes the handful of named and numeric entities [`html_escape`] emits.
pub(crate) fn decode_entities(s: &str) -> Cow<'_, str> {
	if !s.contains('&') {
		return Cow::Borrowed(s);
	}
	let mut out = String::with_capacity(s.len());
	let mut rest = s;
	while let Some(index) = rest.find('&') {
		out.push_str(&rest[..index]);
		let tail = &rest[index..];
		match ENTITIES.iter().find(|(entity, _)| tail.starts_with(entity)) {
			Some((entity, decoded)) => {
				out.push(*decoded);
				rest = &tail[entity.len()..];
			}
			None => {
				out.push('&');
				rest = &tail[1..];
			}
		}
	}
	out.push_str(rest);
	Cow::Owned(out)
}

pub(crate) fn serialize_into(nodes: &[Node], out: &mut String) {
	for node in nodes {
		match node {
			Node::Element(element) => {
				out.push_str(&element.open_tag);
				serialize_into(&element.children, out);
				if let Some(close) = &element.close_tag {
					out.push_str(close);
				}
			}
			Node::Text(text) | Node::Raw(text) => out.push_str(text),
		}
	}
}

fn collect_text(nodes: &[Node], out: &mut String) {
	for node in nodes {
		match node {
			Node::Element(element) => collect_text(&element.children, out),
			Node::Text(text) => out.push_str(text),
			Node::Raw(_) => {}
		}
	}
}

/// Parses a markup fragment into a node list.
pub(crate) fn parse_fragment(input: &str) -> Vec<Node> {
	let mut builder = TreeBuilder::default();
	let mut pos = 0;
	while pos < input.len() {
		let rest = &input[pos..];
		let consumed = if rest.starts_with("<!--") {
			let end = rest[4..].find("-->").map_or(rest.len(), |i| i + 7);
			builder.push(Node::Raw(rest[..end].to_string()));
			end
		} else if rest.starts_with("</") {
			match scan_close_tag(rest) {
				Some((name, len)) => {
					builder.close(&name, &rest[..len]);
					len
				}
				None => builder.text(rest),
			}
		} else if rest.starts_with("<!") || rest.starts_with("<?") {
			let end = rest.find('>').map_or(rest.len(), |i| i + 1);
			builder.push(Node::Raw(rest[..end].to_string()));
			end
		} else if let Some(tag) = scan_open_tag(rest) {
			builder.open(tag, rest)
		} else {
			builder.text(rest)
		};
		pos += consumed;
	}
	builder.finish()
}

struct OpenTag {
	name: String,
	attributes: Vec<(String, String)>,
	self_closing: bool,
	len: usize,
}

fn is_name_byte(b: u8) -> bool {
	b.is_ascii_alphanumeric() || b == b'-' || b == b':' || b == b'_'
}

fn scan_close_tag(rest: &str) -> Option<(String, usize)> {
	let bytes = rest.as_bytes();
	if !bytes.get(2).is_some_and(u8::is_ascii_alphabetic) {
		return None;
	}
	let mut i = 2;
	while i < bytes.len() && is_name_byte(bytes[i]) {
		i += 1;
	}
	let name = rest[2..i].to_ascii_lowercase();
	let end = rest[i..].find('>')?;
	Some((name, i + end + 1))
}

fn scan_open_tag(rest: &str) -> Option<OpenTag> {
	let bytes = rest.as_bytes();
	if bytes.first() != Some(&b'<') || !bytes.get(1).is_some_and(u8::is_ascii_alphabetic) {
		return None;
	}
	let mut i = 1;
	while i < bytes.len() && is_name_byte(bytes[i]) {
		i += 1;
	}
	let name = rest[1..i].to_ascii_lowercase();
	let mut attributes = Vec::new();

	loop {
		while i < bytes.len() && bytes[i].is_ascii_whitespace() {
			i += 1;
		}
		match bytes.get(i)? {
			b'>' => {
				return Some(OpenTag {
					name,
					attributes,
					self_closing: false,
					len: i + 1,
				});
			}
			b'/' if bytes.get(i + 1) == Some(&b'>') => {
				return Some(OpenTag {
					name,
					attributes,
					self_closing: true,
					len: i + 2,
				});
			}
			b'/' => {
				i += 1;
				continue;
			}
			_ => {}
		}

		let name_start = i;
		while i < bytes.len()
			&& !bytes[i].is_ascii_whitespace()
			&& !matches!(bytes[i], b'=' | b'>' | b'/')
		{
			i += 1;
		}
		let attr_name = rest[name_start..i].to_ascii_lowercase();
		while i < bytes.len() && bytes[i].is_ascii_whitespace() {
			i += 1;
		}

		let mut value = String::new();
		if bytes.get(i) == Some(&b'=') {
			i += 1;
			while i < bytes.len() && bytes[i].is_ascii_whitespace() {
				i += 1;
			}
			match *bytes.get(i)? {
				quote @ (b'"' | b'\'') => {
					let close = rest[i + 1..].find(quote as char)?;
					value = decode_entities(&rest[i + 1..i + 1 + close]).into_owned();
					i += close + 2;
				}
				_ => {
					let value_start = i;
					while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' {
						i += 1;
					}
					value = decode_entities(&rest[value_start..i]).into_owned();
				}
			}
		}

		if !attr_name.is_empty() {
			attributes.push((attr_name, value));
		}
	}
}

#[derive(Default)]
struct TreeBuilder {
	roots: Vec<Node>,
	stack: Vec<ElementNode>,
}

impl TreeBuilder {
	fn siblings(&mut self) -> &mut Vec<Node> {
		match self.stack.last_mut() {
			Some(parent) => &mut parent.children,
			None => &mut self.roots,
		}
	}

	fn push(&mut self, node: Node) {
		self.siblings().push(node);
	}

	/// Consumes text up to the next `<` (always at least one character).
	fn text(&mut self, rest: &str) -> usize {
		let skip = rest.chars().next().map_or(0, char::len_utf8);
		let end = rest[skip..].find('<').map_or(rest.len(), |i| i + skip);
		let chunk = &rest[..end];
		let siblings = self.siblings();
		match siblings.last_mut() {
			Some(Node::Text(previous)) => previous.push_str(chunk),
			_ => siblings.push(Node::Text(chunk.to_string())),
		}
		end
	}

	fn open(&mut self, tag: OpenTag, rest: &str) -> usize {
		let mut element = ElementNode {
			node_id: NodeId::new(),
			tag: tag.name,
			attributes: tag.attributes,
			open_tag: rest[..tag.len].to_string(),
			children: Vec::new(),
			close_tag: None,
		};

		if tag.self_closing || element.is_void() {
			self.push(Node::Element(element));
			return tag.len;
		}

		if RAW_TEXT_ELEMENTS.contains(&element.tag.as_str()) {
			let body = &rest[tag.len..];
			let Some(content_end) = find_raw_text_close(body, &element.tag) else {
				if !body.is_empty() {
					element.children.push(Node::Text(body.to_string()));
				}
				self.push(Node::Element(element));
				return rest.len();
			};
			let close_end = body[content_end..]
				.find('>')
				.map_or(body.len(), |i| content_end + i + 1);
			if content_end > 0 {
				element
					.children
					.push(Node::Text(body[..content_end].to_string()));
			}
			element.close_tag = Some(body[content_end..close_end].to_string());
			self.push(Node::Element(element));
			return tag.len + close_end;
		}

		self.stack.push(element);
		tag.len
	}

	fn close(&mut self, name: &str, raw: &str) {
		let Some(index) = self.stack.iter().rposition(|element| element.tag == name) else {
			self.push(Node::Raw(raw.to_string()));
			return;
		};
		while self.stack.len() > index + 1 {
			self.pop_into_parent();
		}
		if let Some(mut element) = self.stack.pop() {
			element.close_tag = Some(raw.to_string());
			self.push(Node::Element(element));
		}
	}

	fn pop_into_parent(&mut self) {
		if let Some(element) = self.stack.pop() {
			self.push(Node::Element(element));
		}
	}

	fn finish(mut self) -> Vec<Node> {
		while !self.stack.is_empty() {
			self.pop_into_parent();
		}
		self.roots
	}
}

/// Offset of the end tag closing a raw text element, ignoring longer names
/// such as `</scripts>`.
fn find_raw_text_close(body: &str, tag: &str) -> Option<usize> {
	let lower = body.to_ascii_lowercase();
	let needle = format!("</{tag}");
	let mut from = 0;
	while let Some(i) = lower[from..].find(&needle) {
		let start = from + i;
		match lower.as_bytes().get(start + needle.len()) {
			None | Some(b'>' | b'/') => return Some(start),
			Some(b) if b.is_ascii_whitespace() => return Some(start),
			_ => from = start + needle.len(),
		}
	}
	None
}
