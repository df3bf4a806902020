//! Route table and authentication guard

/// Screens of the application, addressed by the same paths as the web client
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Hash)]
pub enum Route {
    #[default]
    Home,
    Signup,
    Signin,
    NewExpense,
    Expenses,
    Profile,
    EditExpense,
    AvgByCategory,
    ScatterChart,
    BarChart,
    PieChart,
}

impl Route {
    pub const ALL: [Route; 11] = [
        Route::Home,
        Route::Signup,
        Route::Signin,
        Route::NewExpense,
        Route::Expenses,
        Route::Profile,
        Route::EditExpense,
        Route::AvgByCategory,
        Route::ScatterChart,
        Route::BarChart,
        Route::PieChart,
    ];

    /// Routes reachable from the navigation bar once signed in, in bar order
    pub const NAV: [Route; 7] = [
        Route::Expenses,
        Route::NewExpense,
        Route::AvgByCategory,
        Route::ScatterChart,
        Route::BarChart,
        Route::PieChart,
        Route::Profile,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Signup => "/signup",
            Route::Signin => "/signin",
            Route::NewExpense => "/new-expense",
            Route::Expenses => "/expenses",
            Route::Profile => "/profile",
            Route::EditExpense => "/edit-expense",
            Route::AvgByCategory => "/exps-avg-by-category",
            Route::ScatterChart => "/scatter-graph-chart",
            Route::BarChart => "/bar-graph-chart",
            Route::PieChart => "/pie-graph-chart",
        }
    }

    pub fn from_path(path: &str) -> Option<Route> {
        let path = match path.trim_end_matches('/') {
            "" => "/",
            p => p,
        };
        Route::ALL.iter().copied().find(|r| r.path() == path)
    }

    pub fn title(&self) -> &'static str {
        match self {
            Route::Home => "Home",
            Route::Signup => "Sign up",
            Route::Signin => "Sign in",
            Route::NewExpense => "New expense",
            Route::Expenses => "Expenses",
            Route::Profile => "Profile",
            Route::EditExpense => "Edit expense",
            Route::AvgByCategory => "By category",
            Route::ScatterChart => "Scatter",
            Route::BarChart => "Bar",
            Route::PieChart => "Pie",
        }
    }

    /// Whether the route needs a signed-in session
    pub fn is_protected(&self) -> bool {
        !matches!(self, Route::Home | Route::Signup | Route::Signin)
    }

    /// Apply the guard: protected routes without a session land on sign-in
    pub fn resolve(self, authenticated: bool) -> Route {
        if self.is_protected() && !authenticated {
            Route::Signin
        } else {
            self
        }
    }

    /// Routes whose views plot the loaded expenses over a time period
    pub fn is_chart(&self) -> bool {
        matches!(self, Route::ScatterChart | Route::BarChart | Route::PieChart)
    }
}
