//! # Stack Planning
//!
//! Decides how many pages a run prints and which ticket lands in which grid
//! cell, so that cutting the printed sheets and stacking them keeps tickets in
//! sequential order.
//!
//! A print shop prints `stack_size` (S) copies of page slot 1, then slot 2,
//! and so on. Each stack of S pages covers a window of `W = S * T` tickets,
//! where T is the number of tickets per page. Within a stack, the page at
//! offset `p` shows block tickets `p, p + S, p + 2S, ...` in its grid cells.
//! After cutting, the pile under each grid cell therefore holds S consecutive
//! tickets.
//!
//! ```text
//! S = 2, T = 2, block = [0, 1, 2, 3]
//!
//!   page offset 0: cells → [0, 2]
//!   page offset 1: cells → [1, 3]
//! ```
//!
//! Every stack prints all S pages, so the final stack may contain pages with
//! empty cells or no tickets at all.

use serde::Serialize;
use std::ops::Range;

/// The page and stack counts of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StackPlan {
    pub ticket_count: usize,
    pub tickets_per_page: usize,
    pub stack_size: usize,
    /// Pages required to hold every ticket.
    pub pages_needed: usize,
    pub stack_count: usize,
    /// Pages actually printed (`stack_count * stack_size`).
    pub total_pages: usize,
}

/// One printed page's place in the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageSlot {
    /// 1-based page number in output order.
    pub page_number: usize,
    pub stack: usize,
    pub page_offset: usize,
}

/// Where a ticket is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Placement {
    pub stack: usize,
    pub page_offset: usize,
    pub cell: usize,
}

impl StackPlan {
    /// Plan a run. `stack_size` must be at least 1.
    pub fn new(ticket_count: usize, tickets_per_page: usize, stack_size: usize) -> Self {
        debug_assert!(stack_size > 0, "stack size must be validated upstream");

        if tickets_per_page == 0 {
            return Self {
                ticket_count,
                tickets_per_page,
                stack_size,
                pages_needed: 0,
                stack_count: 0,
                total_pages: 0,
            };
        }

        let pages_needed = ticket_count.div_ceil(tickets_per_page);
        let stack_count = pages_needed.div_ceil(stack_size);

        Self {
            ticket_count,
            tickets_per_page,
            stack_size,
            pages_needed,
            stack_count,
            total_pages: stack_count.saturating_mul(stack_size),
        }
    }

    /// True when the run prints no pages.
    pub fn is_empty(&self) -> bool {
        self.total_pages == 0
    }

    /// Tickets covered by one full stack.
    pub fn window(&self) -> usize {
        self.stack_size.saturating_mul(self.tickets_per_page)
    }

    /// Ticket indices claimed by `stack`, clamped to the ticket count.
    pub fn block_range(&self, stack: usize) -> Range<usize> {
        let start = stack.saturating_mul(self.window()).min(self.ticket_count);
        let end = start.saturating_add(self.window()).min(self.ticket_count);
        start..end
    }

    /// Every printed page, in output order.
    pub fn pages(&self) -> impl Iterator<Item = PageSlot> + use<> {
        let stack_size = self.stack_size;
        (0..self.total_pages).map(move |i| PageSlot {
            page_number: i + 1,
            stack: i / stack_size,
            page_offset: i % stack_size,
        })
    }

    /// `(cell, block_index)` pairs for the page at `page_offset` of a stack
    /// whose block holds `block_len` tickets.
    pub fn cells(
        &self,
        page_offset: usize,
        block_len: usize,
    ) -> impl Iterator<Item = (usize, usize)> + use<> {
        stride_cells(page_offset, block_len, self.stack_size)
    }

    /// Where ticket `ticket` is printed, or `None` if it is out of range.
    pub fn locate(&self, ticket: usize) -> Option<Placement> {
        if ticket >= self.ticket_count || self.tickets_per_page == 0 {
            return None;
        }
        let window = self.window();
        let local = ticket % window;
        Some(Placement {
            stack: ticket / window,
            page_offset: local % self.stack_size,
            cell: local / self.stack_size,
        })
    }
}

/// Strided interleave: cell `i` of page `page_offset` holds block ticket
/// `page_offset + i * stack_size`.
pub fn stride_cells(
    page_offset: usize,
    block_len: usize,
    stack_size: usize,
) -> impl Iterator<Item = (usize, usize)> {
    (page_offset..block_len).step_by(stack_size.max(1)).enumerate()
}
