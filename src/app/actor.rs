//! App actor - message loop processing UI events and network responses

use tokio::sync::mpsc;

use crate::app::state::AppState;
use crate::messages::{NetworkCommand, NetworkResponse, RenderState, UiEvent};

/// App actor that processes UI events and network responses
pub struct AppActor {
    state: AppState,
    network_tx: mpsc::UnboundedSender<NetworkCommand>,
    render_tx: mpsc::UnboundedSender<RenderState>,
}

impl AppActor {
    pub fn new(
        state: AppState,
        network_tx: mpsc::UnboundedSender<NetworkCommand>,
        render_tx: mpsc::UnboundedSender<RenderState>,
    ) -> Self {
        AppActor {
            state,
            network_tx,
            render_tx,
        }
    }

    /// Run the actor message loop
    pub async fn run(
        mut self,
        mut ui_rx: mpsc::UnboundedReceiver<UiEvent>,
        mut net_rx: mpsc::UnboundedReceiver<NetworkResponse>,
    ) {
        let cmds = self.state.startup();
        self.dispatch(cmds);
        let _ = self.render_tx.send(self.state.to_render_state());

        loop {
            tokio::select! {
                Some(event) = ui_rx.recv() => {
                    if self.handle_ui_event(event) {
                        // Quit signal received
                        let _ = self.network_tx.send(NetworkCommand::Shutdown);
                        break;
                    }
                    let _ = self.render_tx.send(self.state.to_render_state());
                }
                Some(response) = net_rx.recv() => {
                    let cmds = self.state.handle_response(response);
                    self.dispatch(cmds);
                    let _ = self.render_tx.send(self.state.to_render_state());
                }
                else => break,
            }
        }
    }

    fn dispatch(&self, cmds: Vec<NetworkCommand>) {
        for cmd in cmds {
            let _ = self.network_tx.send(cmd);
        }
    }

    /// Handle a UI event, returns true if quit was requested
    fn handle_ui_event(&mut self, event: UiEvent) -> bool {
        let cmds = match event {
            // Navigation
            UiEvent::Navigate(route) => self.state.navigate(route),
            UiEvent::NextField => {
                self.state.next_field();
                Vec::new()
            }
            UiEvent::PrevField => {
                self.state.prev_field();
                Vec::new()
            }

            // Input editing
            UiEvent::StartEditing => {
                self.state.start_editing();
                Vec::new()
            }
            UiEvent::StopEditing => {
                self.state.stop_editing();
                Vec::new()
            }
            UiEvent::CharInput(c) => {
                self.state.enter_char(c);
                Vec::new()
            }
            UiEvent::Backspace => {
                self.state.delete_char();
                Vec::new()
            }
            UiEvent::CursorLeft => {
                self.state.move_cursor_left();
                Vec::new()
            }
            UiEvent::CursorRight => {
                self.state.move_cursor_right();
                Vec::new()
            }
            UiEvent::Submit => self.state.submit(),

            // Expense list
            UiEvent::SelectNext => {
                self.state.select_next();
                Vec::new()
            }
            UiEvent::SelectPrev => {
                self.state.select_prev();
                Vec::new()
            }
            UiEvent::ShowMore => self.state.show_more(),
            UiEvent::Refresh => self.state.refresh(),
            UiEvent::StartSearch => {
                self.state.start_search();
                Vec::new()
            }
            UiEvent::SearchDateRange => self.state.search_date_range(),
            UiEvent::ClearDateRange => self.state.clear_date_range(),
            UiEvent::RequestDelete => {
                self.state.request_delete();
                Vec::new()
            }
            UiEvent::ConfirmDelete => self.state.confirm_delete(),
            UiEvent::CancelDelete => {
                self.state.cancel_delete();
                Vec::new()
            }
            UiEvent::EditSelected => self.state.edit_selected(),

            // Expense form
            UiEvent::NextCategory => {
                self.state.cycle_category(true);
                Vec::new()
            }
            UiEvent::PrevCategory => {
                self.state.cycle_category(false);
                Vec::new()
            }
            UiEvent::OpenNewCategory => {
                self.state.open_new_category();
                Vec::new()
            }
            UiEvent::CloseNewCategory => {
                self.state.close_new_category();
                Vec::new()
            }
            UiEvent::CreateCategory => self.state.create_category(),

            // Profile
            UiEvent::CycleCurrency => {
                self.state.cycle_currency();
                Vec::new()
            }
            UiEvent::SignOut => self.state.sign_out(),

            // Charts
            UiEvent::ChartPrevPeriod => {
                self.state.chart_prev_period();
                Vec::new()
            }
            UiEvent::ChartNextPeriod => {
                self.state.chart_next_period();
                Vec::new()
            }

            // Popups
            UiEvent::ToggleHelp => {
                self.state.toggle_help();
                Vec::new()
            }
            UiEvent::CloseHelp => {
                self.state.close_help();
                Vec::new()
            }

            // System
            UiEvent::Quit => {
                if self.state.route == crate::routes::Route::Expenses {
                    if let Err(e) = self.state.storage.set_scroll_offset(self.state.selected_expense) {
                        tracing::warn!(error = %e, "Failed to save scroll position");
                    }
                }
                return true;
            }
        };

        self.dispatch(cmds);
        false
    }
}
