alloy::sol! {
    interface IEverlongStrategyKeeper {
        struct TendConfig {
            uint256 minOutput;
            uint256 minVaultSharePrice;
            uint256 positionClosureLimit;
            bytes extraData;
        }

        function roleManager() external view returns (address);

        function shouldUpdateDebt(address _vault, address _strategy) external view returns (bool);
        function shouldTend(address _strategy) external view returns (bool);
        function shouldStrategyReport(address _strategy) external view returns (bool);
        function shouldProcessReport(address _vault, address _strategy) external view returns (bool);

        function updateDebt(address _vault, address _strategy) external;
        function tend(address _strategy, TendConfig memory _config) external;
        function strategyReport(address _strategy, TendConfig memory _config) external;
        function processReport(address _vault, address _strategy) external;
    }

    interface IRoleManager {
        function getAllVaults() external view returns (address[] memory);
    }

    interface IVault {
        function get_default_queue() external view returns (address[] memory);
        function asset() external view returns (address);
        function balanceOf(address owner) external view returns (uint256);
        function deposit(uint256 assets, address receiver) external returns (uint256);
        function redeem(uint256 shares, address receiver, address owner) external returns (uint256);
    }

    interface IERC20 {
        function approve(address spender, uint256 amount) external returns (bool);
        function balanceOf(address owner) external view returns (uint256);
        function transfer(address to, uint256 amount) external returns (bool);
    }
}
