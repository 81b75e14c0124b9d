//! Status Bar (Bottom)
//!
//! Displays:
//! - Edit state and creation mode
//! - Selected member
//! - Live placement readout or the last connection query
//! - Status messages (rejected edits in orange)

use iced::widget::{row, text, Space};
use iced::{Element, Length, Padding};

use frame_core::editor::{ConnectionReport, EditState, PreviewReadout};
use frame_core::model::MemberType;
use frame_core::units::LengthUnit;

use crate::Message;

fn format_readout(r: &PreviewReadout, units: LengthUnit) -> String {
    format!(
        "L = {:.2} {}  plan {:.1}°  elev {:.1}°",
        r.distance,
        units.label(),
        r.plan_angle_deg,
        r.elevation_angle_deg
    )
}

fn format_connections(report: &ConnectionReport) -> String {
    let list: Vec<String> = report
        .connections
        .iter()
        .map(|c| format!("{} @ {:.0}°", c.member_id, c.angle_deg))
        .collect();
    format!("{} meets {}", report.picked, list.join(", "))
}

/// Render the status bar
#[allow(clippy::too_many_arguments)]
pub fn view_status_bar<'a>(
    state: &'a EditState,
    create_mode: Option<MemberType>,
    selection: Option<&'a str>,
    units: LengthUnit,
    readout: Option<&'a PreviewReadout>,
    connections: Option<&'a ConnectionReport>,
    status: &'a str,
    is_warning: bool,
) -> Element<'a, Message> {
    let mode = match create_mode {
        Some(t) => format!("{} ({})", state.name(), t.display_name()),
        None => state.name().to_string(),
    };
    let selected = selection.map_or_else(|| "Nothing selected".to_string(), |id| format!("Selected: {}", id));
    let info = match (readout, connections) {
        (Some(r), _) if state.is_placing() => format_readout(r, units),
        (_, Some(c)) => format_connections(c),
        _ => String::new(),
    };
    let status_text = if is_warning {
        text(status).size(10).color([0.8, 0.4, 0.0])
    } else {
        text(status).size(10)
    };

    row![
        text(mode).size(10),
        text(selected).size(10),
        text(info).size(10),
        Space::new().width(Length::Fill),
        text(format!("Snap: {}", units.snap_quantum_label())).size(10),
        status_text,
    ]
    .spacing(16)
    .padding(Padding::from([4, 0]))
    .into()
}
