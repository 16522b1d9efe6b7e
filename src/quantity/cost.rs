quantity!(
    /// Amount of money in Vietnamese dong.
    Cost,
    "VND"
);
