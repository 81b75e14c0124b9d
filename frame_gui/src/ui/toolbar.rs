//! Toolbar component
//!
//! Creation mode buttons on the left, render mode and view controls on the right.

use iced::widget::{button, row, text, Space};
use iced::{Alignment, Element, Length, Padding};

use frame_core::model::MemberType;
use frame_core::settings::RenderMode;

use crate::Message;

fn mode_button(label: &'static str, active: bool, message: Message) -> button::Button<'static, Message> {
    button(text(label).size(11))
        .on_press(message)
        .padding(Padding::from([4, 8]))
        .style(if active { button::primary } else { button::secondary })
}

/// Render the toolbar
pub fn view_toolbar(create_mode: Option<MemberType>, render_mode: RenderMode) -> Element<'static, Message> {
    let create_buttons = row![
        mode_button("Select", create_mode.is_none(), Message::SetCreateMode(None)),
        mode_button(
            "Beam",
            create_mode == Some(MemberType::Beam),
            Message::SetCreateMode(Some(MemberType::Beam))
        ),
        mode_button(
            "Column",
            create_mode == Some(MemberType::Column),
            Message::SetCreateMode(Some(MemberType::Column))
        ),
    ]
    .spacing(4);

    let render_buttons = RenderMode::ALL
        .iter()
        .fold(row![].spacing(4), |r, mode| {
            r.push(mode_button(mode.display_name(), *mode == render_mode, Message::SetRenderMode(*mode)))
        });

    row![
        create_buttons,
        Space::new().width(Length::Fill),
        render_buttons,
        button(text("Reset View").size(11))
            .on_press(Message::ResetCamera)
            .padding(Padding::from([4, 8]))
            .style(button::secondary),
    ]
    .spacing(8)
    .padding(Padding::from([4, 0]))
    .align_y(Alignment::Center)
    .into()
}
