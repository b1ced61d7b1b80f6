use colored::*;
use dao_dashboard_cache::{AuctionCard, DashboardPage, DashboardView, ProposalSection};
use dao_dashboard_types::{Address, ENTRY_SHORTCUTS};

/// Plain text rendering of a dashboard view
pub fn render_view(address: Option<&Address>, view: &DashboardView) -> String {
    let mut out = String::new();
    if let Some(address) = address {
        out.push_str(&format!("{} {}\n\n", "Dashboard for".bold(), address.to_string().yellow()));
    }

    match view {
        DashboardView::Error(message) => {
            out.push_str(&format!("{} {}\n", "Failed to load dashboard:".red(), message));
            out.push_str("Try again later.\n");
        }
        DashboardView::Loading => out.push_str("Loading...\n"),
        DashboardView::NoAddress => out.push_str("Connect a wallet to see your DAOs.\n"),
        DashboardView::Empty => {
            out.push_str(&format!("{}\n", "You are not a member of any DAOs yet.".yellow()));
        }
        DashboardView::Data(page) => render_page(&mut out, page),
    }

    out
}

fn render_page(out: &mut String, page: &DashboardPage) {
    out.push_str(&format!("{}\n", "DAOs".green().bold()));
    for card in &page.daos {
        render_auction(out, card);
    }

    out.push_str(&format!("\n{}\n", "Proposals".green().bold()));
    if page.proposals.is_empty() {
        out.push_str("  No active proposals.\n");
    }
    for section in &page.proposals {
        render_proposals(out, section);
    }

    for warning in &page.warnings {
        out.push_str(&format!("{} {}\n", "warning:".yellow(), warning));
    }
}

fn render_auction(out: &mut String, card: &AuctionCard) {
    out.push_str(&format!("  {} ({})\n", card.dao_name.bold(), card.chain_name));
    out.push_str(&format!("    Auction:     {}\n", card.token_name));
    out.push_str(&format!("    Current bid: {}\n", card.bid_text));
    if card.is_over {
        out.push_str("    Ended\n");
    } else {
        out.push_str(&format!("    Ends in:     {}\n", card.countdown_text));
    }
    out.push_str(&format!("    Min bid:     {} ETH\n", card.min_bid_text));
}

fn render_proposals(out: &mut String, section: &ProposalSection) {
    out.push_str(&format!("  {}\n", section.dao_name.bold()));
    for proposal in &section.proposals {
        out.push_str(&format!(
            "    #{} {} [{}]\n",
            proposal.number,
            proposal.title,
            proposal.state.as_str().cyan()
        ));
    }
}

pub fn render_tx_types() -> String {
    ENTRY_SHORTCUTS
        .iter()
        .map(|tx| format!("{:<10} {}\n           {}\n", tx.key().green(), tx.title().bold(), tx.subtitle()))
        .collect()
}
