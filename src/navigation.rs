//! The navigation bar shown at the top of each page, with a bottom bar on small screens.

use maud::{Markup, html};

use crate::endpoints;

/// The pages in the navigation bar, in display order.
const PAGES: [(&str, &str); 5] = [
    (endpoints::DASHBOARD_VIEW, "Dashboard"),
    (endpoints::TRANSACTIONS_VIEW, "Transactions"),
    (endpoints::BUDGET_GOALS_VIEW, "Goals"),
    (endpoints::PROFILE_VIEW, "Profile"),
    (endpoints::LOG_OUT, "Log out"),
];

const DESKTOP_LINK_STYLE: &str = "block py-2 px-3 text-gray-900 rounded-sm hover:bg-gray-100
    lg:hover:bg-transparent lg:border-0 lg:hover:text-blue-700 lg:p-0
    dark:text-white lg:dark:hover:text-blue-500 dark:hover:bg-gray-700
    dark:hover:text-white lg:dark:hover:bg-transparent";
const DESKTOP_CURRENT_LINK_STYLE: &str = "block py-2 px-3 text-white bg-blue-700 rounded-sm
    lg:bg-transparent lg:text-blue-700 lg:p-0 dark:text-white lg:dark:text-blue-500";

const MOBILE_LINK_STYLE: &str = "flex w-full min-w-0 items-center justify-center rounded-lg
    px-1 py-2 text-xs font-semibold leading-tight text-gray-600
    hover:bg-blue-50/70 hover:text-blue-700 dark:text-gray-300
    dark:hover:bg-blue-900/20 dark:hover:text-blue-200";
const MOBILE_CURRENT_LINK_STYLE: &str = "flex w-full min-w-0 items-center justify-center rounded-lg
    bg-blue-50 px-1 py-2 text-xs font-semibold leading-tight text-blue-700 shadow-sm
    dark:bg-blue-900/30 dark:text-blue-200";

#[derive(Debug, Clone, Copy, PartialEq)]
struct Link<'a> {
    url: &'a str,
    title: &'a str,
    is_current: bool,
}

impl Link<'_> {
    fn render(self, style: &str, current_style: &str) -> Markup {
        html!(
            a
                href=(self.url)
                class=(if self.is_current { current_style } else { style })
                aria-current=[self.is_current.then_some("page")]
            {
                span class="truncate" { (self.title) }
            }
        )
    }
}

/// Whether the page at `active_endpoint` belongs to the section at `url`,
/// e.g. `/transactions/new` is part of `/transactions`.
fn is_in_section(active_endpoint: &str, url: &str) -> bool {
    active_endpoint
        .strip_prefix(url)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// The site navigation with the link for the current section highlighted.
pub struct NavBar<'a> {
    links: Vec<Link<'a>>,
}

impl NavBar<'_> {
    /// Get the navigation bar for the page at `active_endpoint`.
    ///
    /// At most one link is marked as current. Log out is never current.
    pub fn new(active_endpoint: &str) -> NavBar<'static> {
        let links = PAGES
            .iter()
            .map(|&(url, title)| Link {
                url,
                title,
                is_current: url != endpoints::LOG_OUT && is_in_section(active_endpoint, url),
            })
            .collect();

        NavBar { links }
    }

    /// Render the desktop navigation bar and the mobile bottom bar.
    pub fn into_html(self) -> Markup {
        // Template adapted from https://flowbite.com/docs/components/navbar/#default-navbar
        html!(
            nav class="bg-white border-gray-200 dark:bg-gray-900"
            {
                div
                    class="max-w-screen-xl flex flex-wrap items-center justify-between mx-auto p-4"
                {
                    a
                        href=(endpoints::DASHBOARD_VIEW)
                        class="flex items-center space-x-3 rtl:space-x-reverse"
                    {
                        img src="/static/favicon-128x128.png" alt="SpendWise Logo" class="h-8";

                        span
                            class="self-center text-2xl font-semibold whitespace-nowrap dark:text-white"
                        {
                            "SpendWise"
                        }
                    }

                    ul
                        class="hidden font-medium lg:flex lg:flex-row lg:space-x-8
                        rtl:space-x-reverse lg:bg-white lg:dark:bg-gray-900"
                    {
                        @for link in &self.links {
                            li { (link.render(DESKTOP_LINK_STYLE, DESKTOP_CURRENT_LINK_STYLE)) }
                        }
                    }
                }
            }

            nav class="fixed inset-x-0 bottom-0 z-40 lg:hidden"
            {
                ul
                    class="mx-4 mb-4 grid grid-cols-5 gap-1 rounded-xl border border-gray-200
                    bg-white/95 p-2 shadow-lg backdrop-blur
                    dark:border-gray-700 dark:bg-gray-900/95"
                    aria-label="Primary"
                {
                    @for link in &self.links {
                        li class="min-w-0" {
                            (link.render(MOBILE_LINK_STYLE, MOBILE_CURRENT_LINK_STYLE))
                        }
                    }
                }
            }
        )
    }
}

#[cfg(test)]
mod nav_bar_tests {
    use scraper::{Html, Selector};

    use crate::{endpoints, navigation::NavBar};

    fn current_urls<'a>(nav_bar: &NavBar<'a>) -> Vec<&'a str> {
        nav_bar
            .links
            .iter()
            .filter(|link| link.is_current)
            .map(|link| link.url)
            .collect()
    }

    #[test]
    fn highlights_the_current_section() {
        let cases = [
            (endpoints::DASHBOARD_VIEW, Some(endpoints::DASHBOARD_VIEW)),
            (endpoints::TRANSACTIONS_VIEW, Some(endpoints::TRANSACTIONS_VIEW)),
            (endpoints::NEW_TRANSACTION_VIEW, Some(endpoints::TRANSACTIONS_VIEW)),
            ("/transactions/7/edit", Some(endpoints::TRANSACTIONS_VIEW)),
            (endpoints::BUDGET_GOALS_VIEW, Some(endpoints::BUDGET_GOALS_VIEW)),
            (endpoints::PROFILE_VIEW, Some(endpoints::PROFILE_VIEW)),
            (endpoints::ROOT, None),
            (endpoints::LOG_OUT, None),
            (endpoints::LOG_IN_VIEW, None),
            (endpoints::INTERNAL_ERROR_VIEW, None),
            (endpoints::TRANSACTIONS_API, None),
            (endpoints::BUDGET_GOALS_API, None),
        ];

        for (endpoint, want) in cases {
            let nav_bar = NavBar::new(endpoint);

            assert_eq!(
                current_urls(&nav_bar),
                want.into_iter().collect::<Vec<_>>(),
                "active endpoint {endpoint}"
            );
        }
    }

    #[test]
    fn section_prefix_must_end_at_a_path_segment() {
        let nav_bar = NavBar::new("/transactionsfoo");

        assert!(current_urls(&nav_bar).is_empty());
    }

    #[test]
    fn both_bars_mark_the_current_page() {
        let html = Html::parse_fragment(
            &NavBar::new(endpoints::BUDGET_GOALS_VIEW)
                .into_html()
                .into_string(),
        );

        let current = html
            .select(&Selector::parse("a[aria-current=page]").unwrap())
            .map(|link| link.value().attr("href").unwrap_or_default().to_owned())
            .collect::<Vec<_>>();
        assert_eq!(current, vec![endpoints::BUDGET_GOALS_VIEW; 2]);

        let links = html.select(&Selector::parse("nav a[href]").unwrap()).count();
        // Brand link plus every page in each bar.
        assert_eq!(links, 1 + 2 * 5);
    }
}
