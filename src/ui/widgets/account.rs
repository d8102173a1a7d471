//! Account overview widget.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Paragraph, Sparkline},
};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use super::{money, panel, pnl_style, render_empty, signed_money};
use crate::api::types::PortfolioHistoryPoint;
use crate::state::{Resource, Store};

/// Account overview: balances, counters and the equity curve.
pub struct AccountPanel;

impl AccountPanel {
    pub fn render(frame: &mut Frame, area: Rect, store: &Store) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(10), Constraint::Min(3)])
            .split(area);

        Self::render_summary(frame, chunks[0], store);
        Self::render_history(frame, chunks[1], store);
    }

    fn render_summary(frame: &mut Frame, area: Rect, store: &Store) {
        let account = &store.account;
        let snapshot = &account.snapshot;
        let label = Style::default().fg(Color::DarkGray);

        let mut lines = Vec::new();
        if let Some(info) = &snapshot.info {
            lines.push(Line::from(vec![
                Span::styled("Account      ", label),
                Span::raw(info.account_number.clone().unwrap_or_else(|| "-".into())),
                Span::raw("  "),
                Span::styled(
                    info.status.clone().unwrap_or_default(),
                    Style::default().fg(Color::Cyan),
                ),
                Span::raw(if info.paper_trading == Some(true) {
                    "  (paper)"
                } else {
                    ""
                }),
            ]));
        }
        lines.push(Line::from(vec![
            Span::styled("Equity       ", label),
            Span::raw(money(account.equity())),
        ]));
        let (cash, buying_power) = match (&snapshot.info, &snapshot.balance) {
            (Some(info), _) if info.cash.is_some() => (info.cash, info.buying_power),
            (_, Some(balance)) => (balance.balance, balance.buying_power),
            _ => (None, None),
        };
        lines.push(Line::from(vec![
            Span::styled("Cash         ", label),
            Span::raw(money(cash)),
        ]));
        lines.push(Line::from(vec![
            Span::styled("Buying power ", label),
            Span::raw(money(buying_power)),
        ]));
        if let Some(stats) = &snapshot.stats {
            lines.push(Line::from(vec![
                Span::styled("Activity     ", label),
                Span::raw(format!(
                    "{} algorithms, {} open positions, {} recent trades",
                    stats.algorithm_count, stats.open_position_count, stats.recent_trade_count
                )),
            ]));
        }
        let automation = match &snapshot.automation {
            Some(status) if status.is_active => {
                Span::styled("active", Style::default().fg(Color::Green))
            }
            Some(_) => Span::styled("stopped", Style::default().fg(Color::Yellow)),
            None => Span::raw("-"),
        };
        lines.push(Line::from(vec![
            Span::styled("Automation   ", label),
            automation,
        ]));
        if let Some(pnl) = snapshot.automation.as_ref().and_then(|s| s.pnl)
            && let Some(pnl) = Decimal::from_f64_retain(pnl)
        {
            lines.push(Line::from(vec![
                Span::styled("Auto P&L     ", label),
                Span::styled(signed_money(pnl), pnl_style(pnl)),
            ]));
        }

        let title = match &account.last_updated {
            Some(at) => format!(" Account | updated {} ", at.format("%H:%M:%S")),
            None => " Account ".to_string(),
        };
        frame.render_widget(Paragraph::new(lines).block(panel(title)), area);
    }

    fn render_history(frame: &mut Frame, area: Rect, store: &Store) {
        let history = &store.account.snapshot.history;
        let title = match store.account.history_change() {
            Some(change) => format!(" Equity ({} points, {}) ", history.len(), signed_money(change)),
            None => " Equity ".to_string(),
        };

        if history.is_empty() {
            frame.render_widget(panel(title), area);
            render_empty(
                frame,
                area,
                store.app.is_loading_resource(Resource::Account),
                "history",
            );
            return;
        }

        let color = match store.account.history_change() {
            Some(change) if change < Decimal::ZERO => Color::Red,
            _ => Color::Green,
        };
        let data = sparkline_data(history);
        let sparkline = Sparkline::default()
            .block(panel(title))
            .data(&data)
            .style(Style::default().fg(color));
        frame.render_widget(sparkline, area);
    }
}

/// Equity points rebased on the minimum, in cents.
fn sparkline_data(history: &[PortfolioHistoryPoint]) -> Vec<u64> {
    let min = history
        .iter()
        .map(|p| p.equity)
        .min()
        .unwrap_or_default();
    history
        .iter()
        .map(|p| {
            ((p.equity - min) * Decimal::ONE_HUNDRED)
                .to_u64()
                .unwrap_or_default()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_sparkline_data_rebases_on_minimum() {
        let history: Vec<PortfolioHistoryPoint> = [dec!(100.50), dec!(100.00), dec!(101.25)]
            .into_iter()
            .map(|equity| PortfolioHistoryPoint {
                date: "2024-03-01".into(),
                equity,
            })
            .collect();

        assert_eq!(sparkline_data(&history), vec![50, 0, 125]);
    }
}
