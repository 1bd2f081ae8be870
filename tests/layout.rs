use proptest::prelude::*;
use tealeaf::{
    strip_ansi, visible_width, Align, BorderKind, Color, Component, DiffRenderer, FlexContainer,
    Justify, Size, Spacing, Text,
};

#[test]
fn space_between_spreads_children_to_the_edges() {
    let row = FlexContainer::row()
        .justify(Justify::SpaceBetween)
        .child(Text::new("hello"))
        .child(Text::new("goodbye"));

    let lines = row.render(Size::new(20, 1));
    assert_eq!(lines, vec!["hello        goodbye".to_string()]);
    // 20 - (5 + 7) columns of spacing between the two leaves.
    assert_eq!(lines[0].find('g'), Some(5 + 8));
}

#[test]
fn nested_containers_keep_child_colors() {
    let inner = FlexContainer::column()
        .border(BorderKind::Square)
        .border_color(Color::Green)
        .child(Text::new("ok").color(Color::Red));
    let outer = FlexContainer::row()
        .align(Align::Start)
        .child(Text::new("日本"))
        .child(inner);

    let size = outer.min_size();
    assert_eq!(size, Size::new(8, 3));
    let lines = outer.render(size);
    assert_eq!(lines.len(), 3);
    assert_eq!(strip_ansi(&lines[1]), "    │ok│");
    assert!(lines[1].contains("\x1b[31mok\x1b[0m"));
    assert!(lines.iter().all(|line| visible_width(line) == 8));
}

#[test]
fn render_then_write_only_changed_tail() {
    let frame = |middle: &str| {
        FlexContainer::column()
            .child(Text::new("1"))
            .child(Text::new("2"))
            .child(Text::new(middle))
            .child(Text::new("4"))
            .child(Text::new("5"))
            .render(Size::new(1, 5))
    };
    let terminal = Size::new(10, 10);
    let mut writer = DiffRenderer::new();
    writer.render(frame("3"), terminal);

    let cmds = writer.render(frame("X"), terminal);
    assert_eq!(
        tealeaf::core::output::encode_all(&cmds),
        "\x1b[2A\r\x1b[JX\r\n4\r\n5"
    );
    assert!(writer.render(frame("X"), terminal).is_empty());
}

fn color() -> impl Strategy<Value = Option<Color>> {
    prop_oneof![
        Just(None),
        Just(Some(Color::Red)),
        Just(Some(Color::BrightCyan)),
        (0u8..=255).prop_map(|index| Some(Color::Ansi256(index))),
        (any::<u8>(), any::<u8>(), any::<u8>()).prop_map(|(r, g, b)| Some(Color::Rgb(r, g, b))),
    ]
}

fn leaf() -> impl Strategy<Value = Text> {
    (
        "[a-z 日本é]{0,8}(\n[a-z 日本é]{0,8}){0,2}",
        color(),
        color(),
        prop::bool::ANY,
        0usize..2,
    )
        .prop_map(|(content, text_color, border_color, bordered, padding)| {
            let mut text = Text::new(content).padding(Spacing::all(padding));
            if bordered {
                text = text.border(BorderKind::Rounded);
            }
            if let Some(color) = text_color {
                text = text.color(color);
            }
            if let Some(color) = border_color {
                text = text.border_color(color);
            }
            text
        })
}

proptest! {
    #[test]
    fn stripping_colors_reproduces_plain_text(
        leaves in prop::collection::vec(leaf(), 1..4),
        grow in 0usize..3,
        width in 1usize..40,
        height in 1usize..10,
        column in prop::bool::ANY,
    ) {
        let mut container = if column { FlexContainer::column() } else { FlexContainer::row() };
        for (index, leaf) in leaves.into_iter().enumerate() {
            container = if index == 0 { container.grow_child(leaf, grow) } else { container.child(leaf) };
        }

        let size = Size::new(width, height);
        let buffer = container.render_to_buffer(size);
        let colored = container.render(size);

        prop_assert_eq!(colored.len(), buffer.lines().len());
        for (line, plain) in colored.iter().zip(buffer.lines()) {
            prop_assert_eq!(&strip_ansi(line), plain);
            prop_assert_eq!(visible_width(line), width);
        }
    }
}
